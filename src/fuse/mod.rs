// FUSE interface implementation
//
// This module provides FUSE (Filesystem in Userspace) support,
// allowing the posts table to be mounted as a flat directory.

pub mod adapter;
pub mod backend;
pub mod interface;
pub mod mount;

pub use adapter::FuseAdapter;
pub use backend::{PostBackend, ROOT_INODE};
pub use interface::{DirEntry, FileAttr, FileType, FilesystemInterface, FsError, FsResult, StatFs};
pub use mount::{MountOptions, mount, unmount};
