use anyhow::{Result, bail};
use async_trait::async_trait;
use sqlx::mysql::MySqlPool;

use crate::types::{ContentId, PostId};

use super::models::{ContentRecord, PostDefaults, PostRow};
use super::pool::DatabasePool;
use super::traits::ContentStore;

/// Content store over a WordPress-style `posts` table.
///
/// Only rows whose `post_type` matches the configured type are visible.
pub struct PostOperations {
    pool: MySqlPool,
    posts_table: String,
    meta_table: String,
    defaults: PostDefaults,
}

impl PostOperations {
    pub fn new(pool: &DatabasePool, table_prefix: &str, defaults: PostDefaults) -> Result<Self> {
        validate_table_prefix(table_prefix)?;

        Ok(Self {
            pool: pool.pool().clone(),
            posts_table: format!("{}posts", table_prefix),
            meta_table: format!("{}postmeta", table_prefix),
            defaults,
        })
    }

    /// Find the row id a content identifier currently resolves to.
    async fn locate(&self, id: &ContentId) -> Result<Option<PostId>> {
        let post_id = match id.post_id() {
            Some(post_id) => {
                let sql = format!(
                    "SELECT ID FROM {} WHERE ID = ? AND post_name = ? AND post_type = ?",
                    self.posts_table
                );
                sqlx::query_scalar::<_, PostId>(&sql)
                    .bind(post_id)
                    .bind(id.slug())
                    .bind(&self.defaults.post_type)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT ID FROM {} WHERE post_name = ? AND post_type = ? ORDER BY ID LIMIT 1",
                    self.posts_table
                );
                sqlx::query_scalar::<_, PostId>(&sql)
                    .bind(id.slug())
                    .bind(&self.defaults.post_type)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(post_id)
    }
}

/// Table prefixes are spliced into SQL, so only identifier characters pass.
fn validate_table_prefix(prefix: &str) -> Result<()> {
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("Invalid table prefix: {:?}", prefix);
    }
    Ok(())
}

#[async_trait]
impl ContentStore for PostOperations {
    async fn exists(&self, id: &ContentId) -> Result<bool> {
        Ok(self.locate(id).await?.is_some())
    }

    async fn fetch(&self, id: &ContentId) -> Result<Option<ContentRecord>> {
        let Some(post_id) = self.locate(id).await? else {
            return Ok(None);
        };

        let sql = format!(
            r#"
            SELECT ID, post_name, CAST(post_content AS BINARY) AS post_content
            FROM {}
            WHERE ID = ?
            "#,
            self.posts_table
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ContentRecord::from))
    }

    async fn list_all(&self) -> Result<Vec<ContentId>> {
        let sql = format!(
            "SELECT ID, post_name FROM {} WHERE post_type = ? ORDER BY ID",
            self.posts_table
        );
        let rows = sqlx::query_as::<_, (PostId, String)>(&sql)
            .bind(&self.defaults.post_type)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(post_id, slug)| ContentId::keyed(post_id, slug)).collect())
    }

    async fn create(&self, id: &ContentId) -> Result<Option<ContentId>> {
        let sql = format!(
            r#"
            INSERT INTO {} (
                post_date, post_date_gmt, post_content, post_title, post_excerpt, post_status,
                post_name, to_ping, pinged, post_modified, post_modified_gmt,
                post_content_filtered, post_type
            )
            VALUES (NOW(), UTC_TIMESTAMP(), '', ?, '', ?, ?, '', '', NOW(), UTC_TIMESTAMP(), '', ?)
            "#,
            self.posts_table
        );
        let result = sqlx::query(&sql)
            .bind(&self.defaults.title)
            .bind(&self.defaults.post_status)
            .bind(id.slug())
            .bind(&self.defaults.post_type)
            .execute(&self.pool)
            .await?;

        let post_id = result.last_insert_id();
        if post_id == 0 {
            return Ok(None);
        }

        tracing::debug!(post_id = post_id, slug = %id.slug(), "Created post");

        Ok(Some(ContentId::keyed(post_id, id.slug())))
    }

    async fn update(&self, id: &ContentId, content: Vec<u8>) -> Result<bool> {
        let Some(post_id) = self.locate(id).await? else {
            return Ok(false);
        };

        let sql = format!(
            r#"
            UPDATE {}
            SET post_content = ?, post_modified = NOW(), post_modified_gmt = UTC_TIMESTAMP()
            WHERE ID = ?
            "#,
            self.posts_table
        );
        let size = content.len();
        sqlx::query(&sql).bind(content).bind(post_id).execute(&self.pool).await?;

        tracing::debug!(post_id = post_id, size = size, "Updated post");

        Ok(true)
    }

    async fn delete(&self, id: &ContentId) -> Result<bool> {
        let Some(post_id) = self.locate(id).await? else {
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;

        let delete_meta = format!("DELETE FROM {} WHERE post_id = ?", self.meta_table);
        sqlx::query(&delete_meta).bind(post_id).execute(&mut *tx).await?;

        let delete_post = format!("DELETE FROM {} WHERE ID = ?", self.posts_table);
        let result = sqlx::query(&delete_post).bind(post_id).execute(&mut *tx).await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(post_id = post_id, "Deleted post");
        }

        Ok(deleted)
    }

    async fn rename(&self, from: &ContentId, to: &ContentId) -> Result<bool> {
        let Some(post_id) = self.locate(from).await? else {
            return Ok(false);
        };

        let sql = format!(
            r#"
            UPDATE {}
            SET post_name = ?, post_modified = NOW(), post_modified_gmt = UTC_TIMESTAMP()
            WHERE ID = ?
            "#,
            self.posts_table
        );
        sqlx::query(&sql).bind(to.slug()).bind(post_id).execute(&self.pool).await?;

        tracing::debug!(post_id = post_id, from = %from.slug(), to = %to.slug(), "Renamed post");

        Ok(true)
    }
}
