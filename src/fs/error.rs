use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotDirectory(String),

    #[error("Is a directory: {0}")]
    IsDirectory(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path too long: {0} bytes (max 4096)")]
    PathTooLong(usize),

    #[error("Filename too long: {0} bytes (max 255)")]
    FilenameTooLong(usize),

    #[error("File too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl FsError {
    /// Convert to POSIX errno
    pub fn to_errno(&self) -> i32 {
        match self {
            FsError::PathNotFound(_) => libc::ENOENT,
            FsError::AlreadyExists(_) => libc::EEXIST,
            FsError::NotDirectory(_) => libc::ENOTDIR,
            FsError::IsDirectory(_) => libc::EISDIR,
            FsError::InvalidPath(_) => libc::EINVAL,
            FsError::PathTooLong(_) | FsError::FilenameTooLong(_) => libc::ENAMETOOLONG,
            FsError::FileTooLarge(_) => libc::EFBIG,
            FsError::NotSupported(_) => libc::ENOSYS,
            FsError::Storage(_) => libc::EIO,
        }
    }
}
