// Path <-> content identifier translation
//
// The content store has no notion of paths, so every file name is derived
// from a post slug and decoded back on lookup. Translations are cached in two
// maps that are only ever touched together under one lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::fs::error::{FsError, FsResult};
use crate::fs::path::{file_name, segment_to_slug, slug_to_segment};
use crate::types::{ContentId, split_id_prefix};

pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Cached bidirectional mapping
///
/// Invariant: if `path_to_id[p] == i` then `id_to_path[i]` is either `p` or
/// absent, and vice versa.
#[derive(Default)]
struct CodecMaps {
    path_to_id: HashMap<String, ContentId>,
    id_to_path: HashMap<ContentId, String>,
}

impl CodecMaps {
    /// Record `path <-> id`, dropping whatever either side was bound to before.
    fn bind(&mut self, path: String, id: ContentId) {
        if let Some(old_id) = self.path_to_id.remove(&path) {
            self.id_to_path.remove(&old_id);
        }
        if let Some(old_path) = self.id_to_path.remove(&id) {
            self.path_to_id.remove(&old_path);
        }
        self.path_to_id.insert(path.clone(), id.clone());
        self.id_to_path.insert(id, path);
    }

    fn forget_path(&mut self, path: &str) {
        if let Some(id) = self.path_to_id.remove(path) {
            if self.id_to_path.get(&id).is_some_and(|p| p == path) {
                self.id_to_path.remove(&id);
            }
        }
    }

    fn forget_id(&mut self, id: &ContentId) {
        if let Some(path) = self.id_to_path.remove(id) {
            if self.path_to_id.get(&path).is_some_and(|i| i == id) {
                self.path_to_id.remove(&path);
            }
        }
    }

    fn len(&self) -> usize {
        self.path_to_id.len().max(self.id_to_path.len())
    }

    fn clear(&mut self) {
        self.path_to_id.clear();
        self.id_to_path.clear();
    }
}

/// Translates between filesystem paths and content identifiers.
///
/// Safe to share between FUSE worker threads.
pub struct PathCodec {
    maps: Mutex<CodecMaps>,
    max_entries: usize,
}

impl Default for PathCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl PathCodec {
    pub fn new(max_entries: usize) -> Self {
        Self { maps: Mutex::new(CodecMaps::default()), max_entries: max_entries.max(1) }
    }

    fn maps(&self) -> MutexGuard<'_, CodecMaps> {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remember(&self, maps: &mut CodecMaps, path: String, id: ContentId) {
        if maps.len() >= self.max_entries {
            tracing::debug!(entries = maps.len(), "Path cache full, clearing");
            maps.clear();
        }
        maps.bind(path, id);
    }

    /// Resolve a file path to the identifier of the post it names.
    ///
    /// Cached translations win, so a listed name maps back to the exact slug
    /// it was rendered from. Otherwise names carrying a `<digits>_` prefix
    /// decode to a keyed identifier (not cached), and anything else decodes
    /// into a bare slug which is then cached.
    pub fn to_identifier(&self, path: &str) -> FsResult<ContentId> {
        let name = file_name(path)?.ok_or_else(|| FsError::IsDirectory("/".to_string()))?;

        let path = format!("/{}", name);
        let mut maps = self.maps();
        if let Some(id) = maps.path_to_id.get(&path) {
            return Ok(id.clone());
        }

        if let Some((post_id, rest)) = split_id_prefix(&name) {
            return Ok(ContentId::keyed(post_id, segment_to_slug(rest)));
        }

        let id = ContentId::slug_only(segment_to_slug(&name));
        self.remember(&mut maps, path, id.clone());
        Ok(id)
    }

    /// Decode the whole file name as a bare slug, `<digits>_` prefix included.
    ///
    /// A numbered name that names no post by id is this slug instead, so
    /// `/2024_report` can still be created and found. Never cached.
    pub fn to_slug_identifier(&self, path: &str) -> FsResult<ContentId> {
        let name = file_name(path)?.ok_or_else(|| FsError::IsDirectory("/".to_string()))?;
        Ok(ContentId::slug_only(segment_to_slug(&name)))
    }

    /// Render the path under which a post is listed.
    pub fn to_path(&self, id: &ContentId) -> String {
        let mut maps = self.maps();
        if let Some(path) = maps.id_to_path.get(id) {
            return path.clone();
        }

        let segment = slug_to_segment(id.slug());
        let path = match id.post_id() {
            Some(post_id) => format!("/{}_{}", post_id, segment),
            None => format!("/{}", segment),
        };
        self.remember(&mut maps, path.clone(), id.clone());
        path
    }

    /// Drop cached translations for a path and/or identifier.
    ///
    /// Must follow every store mutation that changes which post a path names.
    pub fn invalidate(&self, path: Option<&str>, id: Option<&ContentId>) {
        let mut maps = self.maps();
        if let Some(path) = path {
            // Cache keys are normalized; an unparsable path was never cached.
            if let Ok(Some(name)) = file_name(path) {
                maps.forget_path(&format!("/{}", name));
            }
        }
        if let Some(id) = id {
            maps.forget_id(id);
        }
    }

    /// Number of cached translations.
    pub fn len(&self) -> usize {
        self.maps().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
