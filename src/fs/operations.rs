use std::collections::HashSet;
use std::sync::Arc;

use crate::fs::codec::PathCodec;
use crate::fs::error::{FsError, FsResult};
use crate::fs::path::{MAX_FILENAME_LENGTH, normalize_path};
use crate::storage::{ContentRecord, ContentStore};
use crate::types::ContentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// What an attribute query learns about a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStat {
    pub kind: NodeKind,
    pub size: u64,
    pub nlinks: u32,
    /// Backing post, for files
    pub id: Option<ContentId>,
}

impl NodeStat {
    fn directory() -> Self {
        Self { kind: NodeKind::Directory, size: 0, nlinks: 2, id: None }
    }

    fn file(record: &ContentRecord) -> Self {
        Self { kind: NodeKind::File, size: record.len(), nlinks: 1, id: Some(record.id.clone()) }
    }
}

/// POSIX-style file operations over a content store.
///
/// The root is the only directory and every post is a file directly below it.
/// No content is cached here: each call re-resolves its path and goes to the
/// store, so reads always observe the store's current value.
pub struct PostFileSystem {
    store: Arc<dyn ContentStore>,
    codec: PathCodec,
}

impl PostFileSystem {
    pub fn new(store: Arc<dyn ContentStore>, codec: PathCodec) -> Self {
        Self { store, codec }
    }

    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    pub fn is_directory(&self, path: &str) -> bool {
        matches!(normalize_path(path).as_deref(), Ok("/"))
    }

    /// The identifier `path` names and its post, if any.
    ///
    /// A numbered name is tried by id first. When no post has that id and
    /// slug, the whole name is tried as a plain slug.
    async fn resolve(&self, path: &str) -> FsResult<Option<(ContentId, ContentRecord)>> {
        let id = self.codec.to_identifier(path)?;
        if let Some(record) = self.store.fetch(&id).await? {
            return Ok(Some((id, record)));
        }
        if !id.is_keyed() {
            return Ok(None);
        }

        let plain = self.codec.to_slug_identifier(path)?;
        Ok(self.store.fetch(&plain).await?.map(|record| (plain, record)))
    }

    async fn fetch(&self, path: &str) -> FsResult<(ContentId, ContentRecord)> {
        self.resolve(path).await?.ok_or_else(|| FsError::PathNotFound(path.to_string()))
    }

    /// Same lookup as `resolve`, without loading content.
    async fn exists(&self, path: &str) -> FsResult<bool> {
        let id = self.codec.to_identifier(path)?;
        if self.store.exists(&id).await? {
            return Ok(true);
        }
        if !id.is_keyed() {
            return Ok(false);
        }

        let plain = self.codec.to_slug_identifier(path)?;
        Ok(self.store.exists(&plain).await?)
    }

    pub async fn get_attr(&self, path: &str) -> FsResult<NodeStat> {
        if self.is_directory(path) {
            return Ok(NodeStat::directory());
        }
        let (_, record) = self.fetch(path).await?;
        Ok(NodeStat::file(&record))
    }

    /// Names in a directory, `.` and `..` first.
    pub async fn list_directory(&self, path: &str) -> FsResult<Vec<String>> {
        if !self.is_directory(path) {
            return Err(FsError::NotDirectory(path.to_string()));
        }

        let ids = self.store.list_all().await?;
        let mut names = Vec::with_capacity(ids.len() + 2);
        names.push(".".to_string());
        names.push("..".to_string());

        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            let path = self.codec.to_path(&id);
            let name = path.trim_start_matches('/').to_string();
            // Longer names would list fine but fail every lookup.
            if name.is_empty() || name.len() > MAX_FILENAME_LENGTH || !seen.insert(name.clone()) {
                tracing::debug!(id = %id, path = %path, "Skipping unlistable post");
                continue;
            }
            names.push(name);
        }

        Ok(names)
    }

    /// Existence check only; no handle state is kept.
    pub async fn open(&self, path: &str) -> FsResult<()> {
        if self.is_directory(path) {
            return Ok(());
        }
        if !self.exists(path).await? {
            return Err(FsError::PathNotFound(path.to_string()));
        }
        Ok(())
    }

    /// Read up to `size` bytes at `offset`. Short (or empty) past end of file.
    pub async fn read(&self, path: &str, offset: u64, size: u32) -> FsResult<Vec<u8>> {
        let (_, record) = self.fetch(path).await?;

        let len = record.content.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(size as usize).min(len);

        Ok(record.content[start..end].to_vec())
    }

    /// Splice `data` into the body at `offset`, growing it as needed. A gap
    /// between the old end and `offset` is zero-filled.
    pub async fn write(&self, path: &str, offset: u64, data: &[u8]) -> FsResult<u32> {
        let (id, record) = self.fetch(path).await?;

        let end = usize::try_from(offset)
            .ok()
            .and_then(|offset| offset.checked_add(data.len()))
            .ok_or(FsError::FileTooLarge(offset))?;
        let offset = end - data.len();
        let written =
            u32::try_from(data.len()).map_err(|_| FsError::FileTooLarge(data.len() as u64))?;

        let mut content = record.content;
        if content.len() < end {
            content.resize(end, 0);
        }
        content[offset..end].copy_from_slice(data);

        if !self.store.update(&id, content).await? {
            return Err(FsError::PathNotFound(path.to_string()));
        }

        Ok(written)
    }

    /// Shrink or zero-extend the body to `size` bytes.
    pub async fn truncate(&self, path: &str, size: u64) -> FsResult<()> {
        let (id, record) = self.fetch(path).await?;

        let size = usize::try_from(size).map_err(|_| FsError::FileTooLarge(size))?;
        if record.content.len() == size {
            return Ok(());
        }

        let mut content = record.content;
        content.resize(size, 0);

        if !self.store.update(&id, content).await? {
            return Err(FsError::PathNotFound(path.to_string()));
        }

        Ok(())
    }

    /// Create an empty post named after `path`.
    ///
    /// A post cannot choose its own id, so a numbered name that named no
    /// post is created under its whole name as a plain slug.
    pub async fn create(&self, path: &str) -> FsResult<NodeStat> {
        if self.exists(path).await? {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        let id = match self.codec.to_identifier(path)? {
            id if id.is_keyed() => self.codec.to_slug_identifier(path)?,
            id => id,
        };
        let created = self.store.create(&id).await?;
        self.codec.invalidate(Some(path), Some(&id));

        match created {
            Some(created) => {
                tracing::debug!(path = %path, id = %created, "Created file");
                Ok(NodeStat { kind: NodeKind::File, size: 0, nlinks: 1, id: Some(created) })
            }
            None => Err(FsError::PathNotFound(path.to_string())),
        }
    }

    /// Delete the post behind `path`. Succeeds whether or not it existed.
    pub async fn unlink(&self, path: &str) -> FsResult<()> {
        let id = match self.codec.to_identifier(path) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Unlink of unresolvable path");
                return Ok(());
            }
        };

        let mut result = self.store.delete(&id).await;
        // Only a clean miss falls through to the plain slug; after an error
        // the numbered post may still exist.
        if matches!(result, Ok(false)) && id.is_keyed() {
            if let Ok(plain) = self.codec.to_slug_identifier(path) {
                result = self.store.delete(&plain).await;
                self.codec.invalidate(None, Some(&plain));
            }
        }

        match result {
            Ok(deleted) => tracing::debug!(path = %path, id = %id, deleted, "Unlinked file"),
            Err(e) => tracing::warn!(path = %path, id = %id, error = %e, "Failed to delete post"),
        }
        self.codec.invalidate(Some(path), Some(&id));

        Ok(())
    }

    /// Move the post at `from` to `to`, replacing whatever post `to` named.
    ///
    /// A numbered `to` keeps its number as the post id only when it is the
    /// moved post's own id. Otherwise the whole name becomes the new slug,
    /// which `to` then resolves to.
    pub async fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        if self.is_directory(from) || self.is_directory(to) {
            return Err(FsError::IsDirectory("/".to_string()));
        }

        let (from_id, record) = self.fetch(from).await?;
        let to_id = self.codec.to_identifier(to)?;
        let new_id = match to_id.post_id() {
            Some(post_id) if Some(post_id) != record.id.post_id() => {
                self.codec.to_slug_identifier(to)?
            }
            _ => to_id.clone(),
        };

        if let Some((existing_id, existing)) = self.resolve(to).await? {
            if existing.id != record.id {
                self.store.delete(&existing_id).await?;
                tracing::debug!(path = %to, id = %existing.id, "Replaced by rename");
            }
        }

        let renamed = self.store.rename(&from_id, &new_id).await?;

        self.codec.invalidate(Some(from), Some(&from_id));
        self.codec.invalidate(Some(to), Some(&to_id));
        self.codec.invalidate(None, Some(&new_id));
        self.codec.invalidate(None, Some(&record.id));

        if !renamed {
            return Err(FsError::PathNotFound(from.to_string()));
        }

        tracing::debug!(from = %from, to = %to, id = %new_id, "Renamed file");
        Ok(())
    }
}
