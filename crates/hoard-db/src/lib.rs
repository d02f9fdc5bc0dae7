//! # hoard-db
//!
//! PostgreSQL database layer for hoard.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for bookmarks, tags, and the job queue
//! - Embedded migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use hoard_db::{Database, PgTagRepository, PoolConfig, TagRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect_with_config("postgres://localhost/hoard", PoolConfig::from_env()).await?;
//!     db.migrate().await?;
//!
//!     let tags = PgTagRepository::new(db.pool().clone());
//!     let tag = tags.create("user_1", "rust").await?;
//!     println!("Created tag: {}", tag.id);
//!     Ok(())
//! }
//! ```

pub mod bookmarks;
pub mod jobs;
pub mod pool;
pub mod tags;

// Re-export core types
pub use hoard_core::*;

pub use bookmarks::PgBookmarkRepository;
pub use jobs::PgJobRepository;
pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tags::PgTagRepository;

/// Connected pool with the embedded schema.
#[derive(Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Postgres>,
}

impl Database {
    /// Connect with the given pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self { pool })
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
