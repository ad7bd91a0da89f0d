pub mod codec;
pub mod error;
pub mod operations;
pub mod path;

pub use codec::PathCodec;
pub use error::{FsError, FsResult};
pub use operations::{NodeKind, NodeStat, PostFileSystem};
