use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ContentId, PostId};

/// A post as the filesystem sees it: an identifier and an opaque body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: ContentId,
    pub content: Vec<u8>,
}

impl ContentRecord {
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Raw row of the posts table, before validation.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    #[sqlx(rename = "ID")]
    pub id: PostId,
    pub post_name: String,
    pub post_content: Vec<u8>,
}

impl From<PostRow> for ContentRecord {
    fn from(row: PostRow) -> Self {
        Self { id: ContentId::keyed(row.id, row.post_name), content: row.post_content }
    }
}

/// Column values for posts created through the mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDefaults {
    pub title: String,
    pub post_type: String,
    pub post_status: String,
}

impl Default for PostDefaults {
    fn default() -> Self {
        Self {
            title: "new post".to_string(),
            post_type: "post".to_string(),
            post_status: "publish".to_string(),
        }
    }
}
