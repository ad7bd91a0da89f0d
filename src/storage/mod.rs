pub mod models;
pub mod pool;
pub mod post;
pub mod traits;

pub use models::*;
pub use pool::DatabasePool;
pub use post::PostOperations;
#[cfg(any(test, feature = "mockall"))]
pub use traits::MockContentStore;
pub use traits::ContentStore;
