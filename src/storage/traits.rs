use anyhow::Result;
use async_trait::async_trait;
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use crate::types::ContentId;

use super::models::ContentRecord;

/// Capabilities the filesystem needs from the backing content store.
///
/// Identifiers are resolved by the store: a keyed identifier must match both
/// post id and slug, a bare one matches by slug alone.
#[cfg_attr(any(test, feature = "mockall"), automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn exists(&self, id: &ContentId) -> Result<bool>;

    async fn fetch(&self, id: &ContentId) -> Result<Option<ContentRecord>>;

    /// Identifiers of every post in the namespace, in no particular order.
    async fn list_all(&self) -> Result<Vec<ContentId>>;

    /// Create a post whose slug is taken from `id`. Returns the identifier the
    /// store assigned, or `None` if nothing was created.
    async fn create(&self, id: &ContentId) -> Result<Option<ContentId>>;

    /// Replace the body. Returns whether a post matched `id`.
    async fn update(&self, id: &ContentId, content: Vec<u8>) -> Result<bool>;

    /// Returns whether a post was removed.
    async fn delete(&self, id: &ContentId) -> Result<bool>;

    /// Give the post at `from` the slug carried by `to`. Returns whether a
    /// post matched `from`.
    async fn rename(&self, from: &ContentId, to: &ContentId) -> Result<bool>;
}
