//! Tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use hoard_core::{validate_tag_name, AttachedBy, Error, Result, Tag, TagRepository};

/// PostgreSQL implementation of TagRepository.
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_tag_row(row: sqlx::postgres::PgRow) -> Tag {
        Tag {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn find_by_names(&self, user_id: &str, names: &[String]) -> Result<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT id, user_id, name, created_at
             FROM bookmark_tags
             WHERE user_id = $1 AND name = ANY($2)
             ORDER BY name",
        )
        .bind(user_id)
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_tag_row).collect())
    }

    async fn create(&self, user_id: &str, name: &str) -> Result<Tag> {
        validate_tag_name(name)?;

        // A concurrent job may have created the same name first; the no-op
        // update makes RETURNING yield the existing row in that case.
        let row = sqlx::query(
            "INSERT INTO bookmark_tags (id, user_id, name, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id, user_id, name, created_at",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::parse_tag_row(row))
    }

    async fn attach(
        &self,
        bookmark_id: &str,
        tag_id: &str,
        attached_by: AttachedBy,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO tags_on_bookmarks (bookmark_id, tag_id, attached_at, attached_by)
             VALUES ($1, $2, $3, $4::attached_by)
             ON CONFLICT (bookmark_id, tag_id) DO NOTHING",
        )
        .bind(bookmark_id)
        .bind(tag_id)
        .bind(Utc::now())
        .bind(attached_by.as_str())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}
