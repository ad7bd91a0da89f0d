// PostBackend - attribute plumbing around PostFileSystem

use super::interface::*;
use crate::config::PostConfig;
use crate::fs::{NodeKind, NodeStat, PostFileSystem};
use chrono::{DateTime, Utc};

pub const ROOT_INODE: u64 = 1;

pub struct PostBackend {
    fs: PostFileSystem,
    uid: u32,
    gid: u32,
    file_mode: u32,
    dir_mode: u32,
    mounted_at: DateTime<Utc>,
}

impl PostBackend {
    /// Files are owned by the mounting user, as the store has no ownership.
    pub fn new(fs: PostFileSystem, posts: &PostConfig) -> Self {
        Self {
            fs,
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
            file_mode: posts.file_mode,
            dir_mode: posts.dir_mode,
            mounted_at: Utc::now(),
        }
    }

    fn node_kind_to_file_type(kind: NodeKind) -> FileType {
        match kind {
            NodeKind::File => FileType::RegularFile,
            NodeKind::Directory => FileType::Directory,
        }
    }

    fn stat_to_attr(&self, stat: &NodeStat) -> FileAttr {
        let (inode, mode) = match stat.kind {
            NodeKind::Directory => (ROOT_INODE, self.dir_mode),
            // Post ids start at 1; shift them clear of the root inode.
            NodeKind::File => {
                let post_id = stat.id.as_ref().and_then(|id| id.post_id());
                (post_id.map_or(0, |id| id + 1), self.file_mode)
            }
        };

        FileAttr {
            inode,
            kind: Self::node_kind_to_file_type(stat.kind),
            size: stat.size,
            atime: self.mounted_at,
            mtime: self.mounted_at,
            ctime: self.mounted_at,
            mode,
            uid: self.uid,
            gid: self.gid,
            nlinks: stat.nlinks,
        }
    }
}

#[async_trait::async_trait]
impl FilesystemInterface for PostBackend {
    async fn open(&self, path: &str) -> FsResult<()> {
        self.fs.open(path).await
    }

    async fn read_file(&self, path: &str, offset: u64, size: u32) -> FsResult<Vec<u8>> {
        self.fs.read(path, offset, size).await
    }

    async fn write_file(&self, path: &str, offset: u64, data: &[u8]) -> FsResult<u32> {
        self.fs.write(path, offset, data).await
    }

    async fn create_file(&self, path: &str, _mode: u32) -> FsResult<FileAttr> {
        let stat = self.fs.create(path).await?;
        Ok(self.stat_to_attr(&stat))
    }

    async fn delete_file(&self, path: &str) -> FsResult<()> {
        self.fs.unlink(path).await
    }

    async fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        self.fs.rename(from, to).await
    }

    async fn truncate(&self, path: &str, size: u64) -> FsResult<()> {
        self.fs.truncate(path, size).await
    }

    async fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let names = self.fs.list_directory(path).await?;
        Ok(names
            .into_iter()
            .map(|name| {
                let kind = if name == "." || name == ".." {
                    FileType::Directory
                } else {
                    FileType::RegularFile
                };
                DirEntry { inode: 0, name, kind }
            })
            .collect())
    }

    async fn get_attr(&self, path: &str) -> FsResult<FileAttr> {
        let stat = self.fs.get_attr(path).await?;
        Ok(self.stat_to_attr(&stat))
    }

    async fn statfs(&self) -> FsResult<StatFs> {
        Ok(StatFs {
            blocks: 1_000_000_000,
            bfree: 500_000_000,
            bavail: 500_000_000,
            files: 10_000_000,
            ffree: 9_000_000,
            bsize: 4096,
            namelen: 255,
        })
    }
}
