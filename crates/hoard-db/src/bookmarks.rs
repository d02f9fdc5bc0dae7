//! Bookmark repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use hoard_core::{Bookmark, BookmarkRepository, BookmarkWithLink, Error, Link, Result};

/// PostgreSQL implementation of BookmarkRepository.
pub struct PgBookmarkRepository {
    pool: Pool<Postgres>,
}

impl PgBookmarkRepository {
    /// Create a new PgBookmarkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    async fn find_with_link(&self, bookmark_id: &str) -> Result<Option<BookmarkWithLink>> {
        // LEFT JOIN: a bookmark without a link row still resolves, with link = None.
        let row = sqlx::query(
            r#"
            SELECT
                b.id,
                b.user_id,
                b.created_at,
                l.bookmark_id AS link_bookmark_id,
                l.url,
                l.title,
                l.description
            FROM bookmarks b
            LEFT JOIN bookmark_links l ON l.bookmark_id = b.id
            WHERE b.id = $1
            "#,
        )
        .bind(bookmark_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let link_bookmark_id: Option<String> = row.get("link_bookmark_id");
        let link = link_bookmark_id.map(|_| Link {
            url: row.get("url"),
            title: row.get("title"),
            description: row.get("description"),
        });

        Ok(Some(BookmarkWithLink {
            bookmark: Bookmark {
                id: row.get("id"),
                user_id: row.get("user_id"),
                created_at: row.get("created_at"),
            },
            link,
        }))
    }
}
