// FUSE adapter - bridges sync FUSE callbacks to async FilesystemInterface
//
// This adapter implements the fuser::Filesystem trait and delegates all operations
// to the async FilesystemInterface implementation. It handles:
// - Async to sync conversion using a dedicated tokio runtime
// - Inode to path mapping
// - FUSE types to FilesystemInterface types conversion
// - Error code translation
//
// IMPORTANT: FUSE callbacks are synchronous and block on the backend future.
// The runtime must not be the one driving the calling thread, or block_on()
// would deadlock; fuser's session thread is outside any runtime.

use super::backend::ROOT_INODE;
use super::interface::{FileAttr, FileType, FilesystemInterface, FsError};
use fuser::{
    FileType as FuseFileType, Filesystem, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, Request, TimeOrNow,
};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::runtime::Runtime;

/// FUSE adapter that bridges sync FUSE callbacks to async FilesystemInterface
pub struct FuseAdapter {
    /// The underlying filesystem implementation
    backend: Arc<dyn FilesystemInterface>,

    /// Runtime the backend futures are driven on
    runtime: Arc<Runtime>,

    /// Inode to path mapping
    /// FUSE uses inodes, but our backend uses paths
    inode_map: RwLock<InodeMap>,
}

/// Manages inode <-> path bidirectional mapping
struct InodeMap {
    /// inode -> path
    inode_to_path: HashMap<u64, String>,

    /// path -> inode
    path_to_inode: HashMap<String, u64>,

    /// Next inode to allocate
    next_inode: u64,
}

impl InodeMap {
    fn new() -> Self {
        let mut map = Self {
            inode_to_path: HashMap::new(),
            path_to_inode: HashMap::new(),
            next_inode: ROOT_INODE + 1,
        };

        map.insert(ROOT_INODE, "/".to_string());

        map
    }

    fn insert(&mut self, inode: u64, path: String) {
        self.inode_to_path.insert(inode, path.clone());
        self.path_to_inode.insert(path, inode);
    }

    /// Get or create inode for path
    fn get_or_create(&mut self, path: &str) -> u64 {
        if let Some(&inode) = self.path_to_inode.get(path) {
            return inode;
        }

        let inode = self.next_inode;
        self.next_inode += 1;
        self.insert(inode, path.to_string());
        inode
    }

    fn get_path(&self, inode: u64) -> Option<&str> {
        self.inode_to_path.get(&inode).map(|s| s.as_str())
    }

    fn remove_path(&mut self, path: &str) {
        if let Some(inode) = self.path_to_inode.remove(path) {
            self.inode_to_path.remove(&inode);
        }
    }

    /// Move the inode at `from` to `to`; whatever `to` pointed at is dropped.
    fn rename(&mut self, from: &str, to: &str) {
        self.remove_path(to);
        if let Some(inode) = self.path_to_inode.remove(from) {
            self.insert(inode, to.to_string());
        }
    }
}

fn child_path(parent_path: &str, name: &str) -> String {
    if parent_path == "/" { format!("/{}", name) } else { format!("{}/{}", parent_path, name) }
}

impl FuseAdapter {
    /// Create a new FUSE adapter with a provided runtime
    ///
    /// The runtime must not be driving the thread FUSE callbacks arrive on.
    pub fn with_runtime(backend: Arc<dyn FilesystemInterface>, runtime: Arc<Runtime>) -> Self {
        Self { backend, runtime, inode_map: RwLock::new(InodeMap::new()) }
    }

    fn inodes(&self) -> RwLockReadGuard<'_, InodeMap> {
        self.inode_map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn inodes_mut(&self) -> RwLockWriteGuard<'_, InodeMap> {
        self.inode_map.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get path from inode
    fn get_path(&self, inode: u64) -> Result<String, libc::c_int> {
        self.inodes().get_path(inode).map(|s| s.to_string()).ok_or(libc::ENOENT)
    }

    /// Resolve `parent` + `name` to a backend path
    fn entry_path(&self, parent: u64, name: &OsStr) -> Result<String, libc::c_int> {
        let name = name.to_str().ok_or(libc::EINVAL)?;
        let parent_path = self.get_path(parent)?;
        Ok(child_path(&parent_path, name))
    }

    /// Execute async operation in tokio runtime
    fn block_on<F, T>(&self, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.runtime.block_on(future)
    }

    /// Convert FsError to errno
    fn error_to_errno(error: FsError) -> libc::c_int {
        if let FsError::Storage(ref e) = error {
            tracing::error!(error = %e, "Content store failure");
        }
        error.to_errno()
    }

    fn to_fuse_file_type(kind: FileType) -> FuseFileType {
        match kind {
            FileType::RegularFile => FuseFileType::RegularFile,
            FileType::Directory => FuseFileType::Directory,
        }
    }

    /// Convert our FileAttr to fuser FileAttr
    fn to_fuse_attr(attr: &FileAttr) -> fuser::FileAttr {
        fuser::FileAttr {
            ino: attr.inode,
            size: attr.size,
            blocks: attr.size.div_ceil(512),
            atime: datetime_to_systemtime(attr.atime),
            mtime: datetime_to_systemtime(attr.mtime),
            ctime: datetime_to_systemtime(attr.ctime),
            crtime: UNIX_EPOCH,
            kind: Self::to_fuse_file_type(attr.kind),
            perm: attr.mode as u16,
            nlink: attr.nlinks,
            uid: attr.uid,
            gid: attr.gid,
            rdev: 0,
            blksize: 4096,
            flags: 0,
        }
    }

    /// Reply to an entry-producing call, assigning the path an inode
    fn reply_entry_attr(&self, path: &str, mut attr: FileAttr) -> fuser::FileAttr {
        attr.inode = self.inodes_mut().get_or_create(path);
        Self::to_fuse_attr(&attr)
    }

    fn lookup_entry(&self, parent: u64, name: &OsStr) -> Result<fuser::FileAttr, libc::c_int> {
        let path = self.entry_path(parent, name)?;
        let attr = self.block_on(self.backend.get_attr(&path)).map_err(Self::error_to_errno)?;
        Ok(self.reply_entry_attr(&path, attr))
    }

    fn attr_of(&self, ino: u64) -> Result<fuser::FileAttr, libc::c_int> {
        let path = self.get_path(ino)?;
        let mut attr = self.block_on(self.backend.get_attr(&path)).map_err(Self::error_to_errno)?;
        attr.inode = ino;
        Ok(Self::to_fuse_attr(&attr))
    }

    /// Entries of directory `ino` with kernel inodes assigned
    fn list_entries(&self, ino: u64) -> Result<Vec<(u64, FuseFileType, String)>, libc::c_int> {
        let path = self.get_path(ino)?;
        let entries = self.block_on(self.backend.read_dir(&path)).map_err(Self::error_to_errno)?;

        let mut map = self.inodes_mut();
        Ok(entries
            .into_iter()
            .map(|entry| {
                let inode = match entry.name.as_str() {
                    "." => ino,
                    // The root is its own parent in a flat namespace
                    ".." => ROOT_INODE,
                    name => map.get_or_create(&child_path(&path, name)),
                };
                (inode, Self::to_fuse_file_type(entry.kind), entry.name)
            })
            .collect())
    }

    fn unlink_entry(&self, parent: u64, name: &OsStr) -> Result<(), libc::c_int> {
        let path = self.entry_path(parent, name)?;
        self.block_on(self.backend.delete_file(&path)).map_err(Self::error_to_errno)?;
        self.inodes_mut().remove_path(&path);
        Ok(())
    }

    /// The inode follows the file; a replaced target loses its inode.
    fn rename_entry(
        &self,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
    ) -> Result<(), libc::c_int> {
        let from = self.entry_path(parent, name)?;
        let to = self.entry_path(newparent, newname)?;
        self.block_on(self.backend.rename(&from, &to)).map_err(Self::error_to_errno)?;
        self.inodes_mut().rename(&from, &to);
        Ok(())
    }
}

/// Convert chrono DateTime to SystemTime
fn datetime_to_systemtime(dt: chrono::DateTime<chrono::Utc>) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(dt.timestamp().max(0) as u64)
}

/// Default TTL for file attributes (1 second)
const ATTR_TTL: Duration = Duration::from_secs(1);

/// Default TTL for directory entries (1 second)
const ENTRY_TTL: Duration = Duration::from_secs(1);

impl Filesystem for FuseAdapter {
    fn init(
        &mut self,
        _req: &Request,
        _config: &mut fuser::KernelConfig,
    ) -> Result<(), libc::c_int> {
        tracing::info!("FUSE filesystem initialized");
        Ok(())
    }

    fn destroy(&mut self) {
        tracing::info!("FUSE filesystem destroyed");
    }

    /// Look up a directory entry by name
    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self.lookup_entry(parent, name) {
            Ok(attr) => reply.entry(&ENTRY_TTL, &attr, 0),
            Err(e) => reply.error(e),
        }
    }

    fn getattr(&mut self, _req: &Request, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match self.attr_of(ino) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(e) => reply.error(e),
        }
    }

    /// Only size changes reach the store; posts carry no ownership or times
    fn setattr(
        &mut self,
        _req: &Request,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let path = match self.get_path(ino) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e);
                return;
            }
        };

        let result = self.block_on(async {
            if let Some(size) = size {
                self.backend.truncate(&path, size).await?;
            }
            self.backend.get_attr(&path).await
        });

        match result {
            Ok(mut attr) => {
                attr.inode = ino;
                reply.attr(&ATTR_TTL, &Self::to_fuse_attr(&attr));
            }
            Err(e) => {
                reply.error(Self::error_to_errno(e));
            }
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let path = match self.get_path(ino) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e);
                return;
            }
        };
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(libc::EINVAL);
            return;
        };

        match self.block_on(self.backend.read_file(&path, offset, size)) {
            Ok(data) => {
                reply.data(&data);
            }
            Err(e) => {
                reply.error(Self::error_to_errno(e));
            }
        }
    }

    fn write(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let path = match self.get_path(ino) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e);
                return;
            }
        };
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(libc::EINVAL);
            return;
        };

        match self.block_on(self.backend.write_file(&path, offset, data)) {
            Ok(written) => {
                reply.written(written);
            }
            Err(e) => {
                reply.error(Self::error_to_errno(e));
            }
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let all_entries = match self.list_entries(ino) {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(e);
                return;
            }
        };

        // Reply with entries starting from offset
        for (i, (inode, kind, name)) in
            all_entries.iter().enumerate().skip(offset.max(0) as usize)
        {
            let buffer_full = reply.add(*inode, (i + 1) as i64, *kind, name);
            if buffer_full {
                break;
            }
        }

        reply.ok();
    }

    fn create(
        &mut self,
        _req: &Request,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        let path = match self.entry_path(parent, name) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e);
                return;
            }
        };

        match self.block_on(self.backend.create_file(&path, mode)) {
            Ok(attr) => {
                let fuse_attr = self.reply_entry_attr(&path, attr);
                reply.created(&ENTRY_TTL, &fuse_attr, 0, 0, 0);
            }
            Err(e) => {
                reply.error(Self::error_to_errno(e));
            }
        }
    }

    // The namespace is flat: the root is the only directory.
    fn mkdir(
        &mut self,
        _req: &Request,
        _parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        tracing::debug!(name = ?name, "mkdir rejected");
        reply.error(Self::error_to_errno(FsError::NotSupported("mkdir".to_string())));
    }

    fn rmdir(&mut self, _req: &Request, _parent: u64, name: &OsStr, reply: ReplyEmpty) {
        tracing::debug!(name = ?name, "rmdir rejected");
        reply.error(Self::error_to_errno(FsError::NotSupported("rmdir".to_string())));
    }

    fn unlink(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        match self.unlink_entry(parent, name) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e),
        }
    }

    fn rename(
        &mut self,
        _req: &Request,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        match self.rename_entry(parent, name, newparent, newname) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e),
        }
    }

    /// Open only checks existence; no file handles are kept
    fn open(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
        let path = match self.get_path(ino) {
            Ok(p) => p,
            Err(e) => {
                reply.error(e);
                return;
            }
        };

        match self.block_on(self.backend.open(&path)) {
            Ok(()) => {
                reply.opened(0, 0);
            }
            Err(e) => {
                reply.error(Self::error_to_errno(e));
            }
        }
    }

    fn release(
        &mut self,
        _req: &Request,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request, _ino: u64, reply: ReplyStatfs) {
        match self.block_on(self.backend.statfs()) {
            Ok(stats) => {
                reply.statfs(
                    stats.blocks,
                    stats.bfree,
                    stats.bavail,
                    stats.files,
                    stats.ffree,
                    stats.bsize,
                    stats.namelen,
                    0, // frsize
                );
            }
            Err(e) => {
                reply.error(Self::error_to_errno(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuse::interface::{DirEntry, FsResult, StatFs};
    use mockall::mock;
    use mockall::predicate::*;
    use std::os::unix::ffi::OsStrExt;

    mock! {
        Backend {}

        #[async_trait::async_trait]
        impl FilesystemInterface for Backend {
            async fn open(&self, path: &str) -> FsResult<()>;
            async fn read_file(&self, path: &str, offset: u64, size: u32) -> FsResult<Vec<u8>>;
            async fn write_file(&self, path: &str, offset: u64, data: &[u8]) -> FsResult<u32>;
            async fn create_file(&self, path: &str, mode: u32) -> FsResult<FileAttr>;
            async fn delete_file(&self, path: &str) -> FsResult<()>;
            async fn rename(&self, from: &str, to: &str) -> FsResult<()>;
            async fn truncate(&self, path: &str, size: u64) -> FsResult<()>;
            async fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntry>>;
            async fn get_attr(&self, path: &str) -> FsResult<FileAttr>;
            async fn statfs(&self) -> FsResult<StatFs>;
        }
    }

    // Plain #[test]s: the adapter blocks on its own runtime.
    fn adapter(backend: MockBackend) -> FuseAdapter {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        FuseAdapter::with_runtime(Arc::new(backend), Arc::new(runtime))
    }

    fn file_attr(size: u64) -> FileAttr {
        let now = chrono::Utc::now();
        FileAttr {
            inode: 0,
            kind: FileType::RegularFile,
            size,
            atime: now,
            mtime: now,
            ctime: now,
            mode: 0o644,
            uid: 1000,
            gid: 1000,
            nlinks: 1,
        }
    }

    fn listing(names: &[&str]) -> Vec<DirEntry> {
        let mut entries = vec![
            DirEntry { inode: 0, name: ".".to_string(), kind: FileType::Directory },
            DirEntry { inode: 0, name: "..".to_string(), kind: FileType::Directory },
        ];
        entries.extend(names.iter().map(|name| DirEntry {
            inode: 0,
            name: name.to_string(),
            kind: FileType::RegularFile,
        }));
        entries
    }

    /// Inode the adapter assigned to `name` while listing the root
    fn listed_inode(adapter: &FuseAdapter, name: &str) -> u64 {
        adapter
            .list_entries(ROOT_INODE)
            .unwrap()
            .into_iter()
            .find(|(_, _, n)| n == name)
            .map(|(ino, _, _)| ino)
            .unwrap()
    }

    #[test]
    fn test_readdir_assigns_stable_inodes() {
        let mut backend = MockBackend::new();
        backend
            .expect_read_dir()
            .with(eq("/"))
            .times(2)
            .returning(|_| Ok(listing(&["1_first", "2_second"])));
        backend.expect_get_attr().with(eq("/1_first")).returning(|_| Ok(file_attr(3)));

        let adapter = adapter(backend);
        let entries = adapter.list_entries(ROOT_INODE).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], (ROOT_INODE, FuseFileType::Directory, ".".to_string()));
        assert_eq!(entries[1], (ROOT_INODE, FuseFileType::Directory, "..".to_string()));
        assert_eq!(entries[2].1, FuseFileType::RegularFile);
        assert!(entries[2].0 > ROOT_INODE);
        assert_ne!(entries[2].0, entries[3].0);

        assert_eq!(adapter.list_entries(ROOT_INODE).unwrap(), entries);
        let attr = adapter.lookup_entry(ROOT_INODE, OsStr::new("1_first")).unwrap();
        assert_eq!(attr.ino, entries[2].0);
        assert_eq!(attr.size, 3);
    }

    #[test]
    fn test_readdir_unknown_inode() {
        let adapter = adapter(MockBackend::new());
        assert_eq!(adapter.list_entries(99).unwrap_err(), libc::ENOENT);
    }

    #[test]
    fn test_readdir_backend_error() {
        let mut backend = MockBackend::new();
        backend
            .expect_read_dir()
            .returning(|path| Err(FsError::NotDirectory(path.to_string())));

        let adapter = adapter(backend);
        assert_eq!(adapter.list_entries(ROOT_INODE).unwrap_err(), libc::ENOTDIR);
    }

    #[test]
    fn test_rename_moves_inode_to_new_name() {
        let mut backend = MockBackend::new();
        backend.expect_read_dir().returning(|_| Ok(listing(&["1_draft"])));
        backend
            .expect_rename()
            .with(eq("/1_draft"), eq("/9_final"))
            .times(1)
            .returning(|_, _| Ok(()));
        backend.expect_get_attr().with(eq("/9_final")).returning(|_| Ok(file_attr(4)));

        let adapter = adapter(backend);
        let ino = listed_inode(&adapter, "1_draft");

        adapter
            .rename_entry(ROOT_INODE, OsStr::new("1_draft"), ROOT_INODE, OsStr::new("9_final"))
            .unwrap();

        assert_eq!(adapter.get_path(ino).unwrap(), "/9_final");
        let attr = adapter.attr_of(ino).unwrap();
        assert_eq!(attr.ino, ino);
        assert_eq!(attr.size, 4);
    }

    #[test]
    fn test_rename_over_existing_drops_target_inode() {
        let mut backend = MockBackend::new();
        backend.expect_read_dir().returning(|_| Ok(listing(&["src", "dst"])));
        backend.expect_rename().times(1).returning(|_, _| Ok(()));

        let adapter = adapter(backend);
        let src = listed_inode(&adapter, "src");
        let dst = listed_inode(&adapter, "dst");

        adapter.rename_entry(ROOT_INODE, OsStr::new("src"), ROOT_INODE, OsStr::new("dst")).unwrap();

        assert_eq!(adapter.get_path(src).unwrap(), "/dst");
        assert_eq!(adapter.get_path(dst).unwrap_err(), libc::ENOENT);
    }

    #[test]
    fn test_rename_failure_keeps_inodes() {
        let mut backend = MockBackend::new();
        backend.expect_read_dir().returning(|_| Ok(listing(&["a"])));
        backend
            .expect_rename()
            .returning(|from, _| Err(FsError::PathNotFound(from.to_string())));

        let adapter = adapter(backend);
        let ino = listed_inode(&adapter, "a");

        let err = adapter.rename_entry(ROOT_INODE, OsStr::new("a"), ROOT_INODE, OsStr::new("b"));
        assert_eq!(err.unwrap_err(), libc::ENOENT);
        assert_eq!(adapter.get_path(ino).unwrap(), "/a");
    }

    #[test]
    fn test_unlink_forgets_inode() {
        let mut backend = MockBackend::new();
        backend.expect_read_dir().returning(|_| Ok(listing(&["1_gone"])));
        backend.expect_delete_file().with(eq("/1_gone")).times(1).returning(|_| Ok(()));
        backend.expect_get_attr().never();

        let adapter = adapter(backend);
        let ino = listed_inode(&adapter, "1_gone");

        adapter.unlink_entry(ROOT_INODE, OsStr::new("1_gone")).unwrap();

        assert_eq!(adapter.get_path(ino).unwrap_err(), libc::ENOENT);
        assert_eq!(adapter.attr_of(ino).unwrap_err(), libc::ENOENT);
    }

    #[test]
    fn test_unlink_failure_keeps_inode() {
        let mut backend = MockBackend::new();
        backend.expect_read_dir().returning(|_| Ok(listing(&["kept"])));
        backend
            .expect_delete_file()
            .returning(|_| Err(FsError::Storage(anyhow::anyhow!("server has gone away"))));

        let adapter = adapter(backend);
        let ino = listed_inode(&adapter, "kept");

        assert_eq!(adapter.unlink_entry(ROOT_INODE, OsStr::new("kept")).unwrap_err(), libc::EIO);
        assert_eq!(adapter.get_path(ino).unwrap(), "/kept");
    }

    #[test]
    fn test_non_utf8_name_is_einval() {
        let mut backend = MockBackend::new();
        backend.expect_delete_file().never();
        backend.expect_rename().never();

        let adapter = adapter(backend);
        let name = OsStr::from_bytes(b"bad\xff");
        assert_eq!(adapter.unlink_entry(ROOT_INODE, name).unwrap_err(), libc::EINVAL);
        assert_eq!(
            adapter.rename_entry(ROOT_INODE, name, ROOT_INODE, OsStr::new("ok")).unwrap_err(),
            libc::EINVAL
        );
    }

    #[test]
    fn test_inode_map_new() {
        let map = InodeMap::new();
        assert_eq!(map.get_path(ROOT_INODE), Some("/"));
        assert_eq!(map.next_inode, 2);
    }

    #[test]
    fn test_inode_map_get_or_create() {
        let mut map = InodeMap::new();
        let ino1 = map.get_or_create("/hello");
        let ino2 = map.get_or_create("/hello");
        assert_eq!(ino1, ino2);
        assert_eq!(map.get_path(ino1), Some("/hello"));
    }

    #[test]
    fn test_inode_map_remove_path() {
        let mut map = InodeMap::new();
        let ino = map.get_or_create("/hello");
        map.remove_path("/hello");
        assert_eq!(map.get_path(ino), None);
        map.remove_path("/never");
    }

    #[test]
    fn test_inode_map_rename_keeps_inode() {
        let mut map = InodeMap::new();
        let ino = map.get_or_create("/hello-world");
        map.rename("/hello-world", "/hello-there");
        assert_eq!(map.get_path(ino), Some("/hello-there"));
        assert_eq!(map.get_or_create("/hello-there"), ino);
        assert_ne!(map.get_or_create("/hello-world"), ino);
    }

    #[test]
    fn test_inode_map_rename_over_existing() {
        let mut map = InodeMap::new();
        let src = map.get_or_create("/src");
        let dst = map.get_or_create("/dst");
        map.rename("/src", "/dst");
        assert_eq!(map.get_path(src), Some("/dst"));
        assert_eq!(map.get_path(dst), None);
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "a"), "/a");
        assert_eq!(child_path("/a", "b"), "/a/b");
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let st = datetime_to_systemtime(dt);
        assert_eq!(st.duration_since(UNIX_EPOCH).unwrap().as_secs(), 1_700_000_000);
    }

    #[test]
    fn test_datetime_before_epoch_clamps() {
        let dt = chrono::DateTime::from_timestamp(-5, 0).unwrap();
        assert_eq!(datetime_to_systemtime(dt), UNIX_EPOCH);
    }
}
