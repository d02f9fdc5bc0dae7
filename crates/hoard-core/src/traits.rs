//! Repository and backend traits.
//!
//! Storage and inference are reached through these traits so job handlers can
//! run against PostgreSQL and a real API in production, and in-memory fakes in
//! tests.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{AttachedBy, BookmarkWithLink, Job, JobType, Result, Tag};

// =============================================================================
// BOOKMARK REPOSITORY
// =============================================================================

/// Read access to bookmarks.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Fetch a bookmark joined with its link. `Ok(None)` if the bookmark does not exist.
    async fn find_with_link(&self, bookmark_id: &str) -> Result<Option<BookmarkWithLink>>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Repository for user-scoped tags and their bookmark associations.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Fetch the user's tags whose names are in `names`.
    async fn find_by_names(&self, user_id: &str, names: &[String]) -> Result<Vec<Tag>>;

    /// Create a tag for the user and return it.
    async fn create(&self, user_id: &str, name: &str) -> Result<Tag>;

    /// Attach a tag to a bookmark. Attaching an already attached tag is a no-op.
    async fn attach(&self, bookmark_id: &str, tag_id: &str, attached_by: AttachedBy)
        -> Result<()>;
}

// =============================================================================
// JOB REPOSITORY
// =============================================================================

/// Repository for the background job queue.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Queue a new job.
    async fn queue(
        &self,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
    ) -> Result<Uuid>;

    /// Claim the next pending job whose type is in `job_types`.
    /// An empty slice means "claim any type".
    async fn claim_next_for_types(&self, job_types: &[JobType]) -> Result<Option<Job>>;

    /// Mark a job as completed.
    async fn complete(&self, job_id: Uuid, result: Option<JsonValue>) -> Result<()>;

    /// Record a failure. The job returns to pending while retries remain.
    async fn fail(&self, job_id: Uuid, error: &str) -> Result<()>;

    /// Get a job by ID.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Count pending jobs.
    async fn pending_count(&self) -> Result<i64>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for chat-completion text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send `system` as the only (system-role) message and request a JSON
    /// object reply. Returns `Ok(None)` when the model produced no content.
    async fn generate_json(&self, system: &str) -> Result<Option<String>>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
