// Filesystem interface abstraction
//
// The protocol-neutral surface the FUSE adapter drives. PostBackend is the
// production implementation; tests mock it.

use chrono::{DateTime, Utc};

pub use crate::fs::error::{FsError, FsResult};

/// File type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    RegularFile,
    Directory,
}

/// File attributes structure
#[derive(Debug, Clone)]
pub struct FileAttr {
    pub inode: u64,
    pub kind: FileType,
    pub size: u64,
    pub atime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    pub ctime: DateTime<Utc>,
    pub mode: u32, // Permission bits
    pub uid: u32,
    pub gid: u32,
    pub nlinks: u32,
}

/// Directory entry structure
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub inode: u64,
    pub name: String,
    pub kind: FileType,
}

/// Filesystem statistics
#[derive(Debug, Clone)]
pub struct StatFs {
    pub blocks: u64,  // Total blocks
    pub bfree: u64,   // Free blocks
    pub bavail: u64,  // Available blocks for unprivileged users
    pub files: u64,   // Total inodes
    pub ffree: u64,   // Free inodes
    pub bsize: u32,   // Block size
    pub namelen: u32, // Maximum filename length
}

/// Path-based filesystem operations
#[async_trait::async_trait]
pub trait FilesystemInterface: Send + Sync {
    // File operations
    async fn open(&self, path: &str) -> FsResult<()>;
    async fn read_file(&self, path: &str, offset: u64, size: u32) -> FsResult<Vec<u8>>;
    async fn write_file(&self, path: &str, offset: u64, data: &[u8]) -> FsResult<u32>;
    async fn create_file(&self, path: &str, mode: u32) -> FsResult<FileAttr>;
    async fn delete_file(&self, path: &str) -> FsResult<()>;
    async fn rename(&self, from: &str, to: &str) -> FsResult<()>;
    async fn truncate(&self, path: &str, size: u64) -> FsResult<()>;

    // Directory operations; entries include `.` and `..`
    async fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntry>>;

    // Metadata operations
    async fn get_attr(&self, path: &str) -> FsResult<FileAttr>;

    // Filesystem information
    async fn statfs(&self) -> FsResult<StatFs>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_equality() {
        assert_eq!(FileType::RegularFile, FileType::RegularFile);
        assert_ne!(FileType::RegularFile, FileType::Directory);
    }

    #[test]
    fn test_dir_entry_construction() {
        let entry = DirEntry { inode: 2, name: "1_hello".to_string(), kind: FileType::RegularFile };
        assert_eq!(entry.inode, 2);
        assert_eq!(entry.name, "1_hello");
        assert_eq!(entry.kind, FileType::RegularFile);
    }

    #[test]
    fn test_reexported_error_errno() {
        assert_eq!(FsError::PathNotFound("/x".to_string()).to_errno(), libc::ENOENT);
        assert_eq!(FsError::NotDirectory("/x".to_string()).to_errno(), libc::ENOTDIR);
    }
}
