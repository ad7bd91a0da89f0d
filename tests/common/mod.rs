// Shared fixtures for integration tests
//
// MemoryStore resolves identifiers the same way the MySQL store does: keyed
// identifiers need id and slug to match, bare ones pick the lowest id with
// that slug.

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use postfs::config::Config;
use postfs::fs::{PathCodec, PostFileSystem};
use postfs::fuse::PostBackend;
use postfs::storage::{ContentRecord, ContentStore};
use postfs::types::{ContentId, PostId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Posts {
    rows: BTreeMap<PostId, (String, Vec<u8>)>,
    next_id: PostId,
}

impl Posts {
    fn locate(&self, id: &ContentId) -> Option<PostId> {
        match id.post_id() {
            Some(post_id) => self
                .rows
                .get(&post_id)
                .filter(|(slug, _)| slug == id.slug())
                .map(|_| post_id),
            None => self
                .rows
                .iter()
                .find(|(_, (slug, _))| slug == id.slug())
                .map(|(post_id, _)| *post_id),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    posts: Mutex<Posts>,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post directly, bypassing the filesystem.
    pub fn insert(&self, slug: &str, content: &[u8]) -> ContentId {
        let mut posts = self.posts.lock().unwrap();
        posts.next_id += 1;
        let post_id = posts.next_id;
        posts.rows.insert(post_id, (slug.to_string(), content.to_vec()));
        ContentId::keyed(post_id, slug)
    }

    pub fn content(&self, post_id: PostId) -> Option<Vec<u8>> {
        self.posts.lock().unwrap().rows.get(&post_id).map(|(_, content)| content.clone())
    }

    pub fn slug(&self, post_id: PostId) -> Option<String> {
        self.posts.lock().unwrap().rows.get(&post_id).map(|(slug, _)| slug.clone())
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().rows.len()
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn exists(&self, id: &ContentId) -> Result<bool> {
        Ok(self.posts.lock().unwrap().locate(id).is_some())
    }

    async fn fetch(&self, id: &ContentId) -> Result<Option<ContentRecord>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts.locate(id).map(|post_id| {
            let (slug, content) = &posts.rows[&post_id];
            ContentRecord { id: ContentId::keyed(post_id, slug.clone()), content: content.clone() }
        }))
    }

    async fn list_all(&self) -> Result<Vec<ContentId>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .rows
            .iter()
            .map(|(post_id, (slug, _))| ContentId::keyed(*post_id, slug.clone()))
            .collect())
    }

    async fn create(&self, id: &ContentId) -> Result<Option<ContentId>> {
        Ok(Some(self.insert(id.slug(), b"")))
    }

    async fn update(&self, id: &ContentId, content: Vec<u8>) -> Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post_id) = posts.locate(id) else {
            return Ok(false);
        };
        if let Some(row) = posts.rows.get_mut(&post_id) {
            row.1 = content;
        }
        Ok(true)
    }

    async fn delete(&self, id: &ContentId) -> Result<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            bail!("connection reset");
        }
        let mut posts = self.posts.lock().unwrap();
        let Some(post_id) = posts.locate(id) else {
            return Ok(false);
        };
        posts.rows.remove(&post_id);
        Ok(true)
    }

    async fn rename(&self, from: &ContentId, to: &ContentId) -> Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post_id) = posts.locate(from) else {
            return Ok(false);
        };
        if let Some(row) = posts.rows.get_mut(&post_id) {
            row.0 = to.slug().to_string();
        }
        Ok(true)
    }
}

pub fn filesystem(store: Arc<MemoryStore>) -> PostFileSystem {
    PostFileSystem::new(store, PathCodec::default())
}

pub fn backend(store: Arc<MemoryStore>) -> PostBackend {
    PostBackend::new(filesystem(store), &Config::default().posts)
}
