pub mod config;
pub mod fs;
pub mod fuse;
pub mod storage;
pub mod types;
