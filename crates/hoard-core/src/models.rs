//! Domain models for hoard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::defaults::TAG_NAME_MAX_LENGTH;
use crate::{Error, Result};

// =============================================================================
// BOOKMARKS
// =============================================================================

/// A saved reference owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// URL metadata attached to a bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Link {
    /// The description, if present and not blank.
    pub fn non_empty_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// A bookmark joined with its (optional) link row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkWithLink {
    pub bookmark: Bookmark,
    pub link: Option<Link>,
}

// =============================================================================
// TAGS
// =============================================================================

/// A user-scoped label. Unique per `(user_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Check a tag name against the storage rules: non-blank, at most
/// [`TAG_NAME_MAX_LENGTH`] characters, no control characters.
pub fn validate_tag_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Tag name cannot be empty".to_string()));
    }
    if name.chars().count() > TAG_NAME_MAX_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Tag name must be {} characters or less",
            TAG_NAME_MAX_LENGTH
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::InvalidInput(
            "Tag name cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Actor that attached a tag to a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachedBy {
    Ai,
    Human,
}

impl AttachedBy {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachedBy::Ai => "ai",
            AttachedBy::Human => "human",
        }
    }
}

impl std::fmt::Display for AttachedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// JOBS
// =============================================================================

/// Status of a job in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Type of job to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Infer tags for a bookmark with a chat-completion model
    TagInference,
}

impl JobType {
    /// Default priority for this job type (higher = more urgent)
    pub fn default_priority(&self) -> i32 {
        match self {
            JobType::TagInference => 5,
        }
    }
}

/// A queued unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub job_type: JobType,
    pub status: JobStatus,
    pub priority: i32,
    pub payload: Option<JsonValue>,
    pub result: Option<JsonValue>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(description: Option<&str>) -> Link {
        Link {
            url: "https://example.com".to_string(),
            title: None,
            description: description.map(String::from),
        }
    }

    #[test]
    fn test_non_empty_description_present() {
        assert_eq!(
            link(Some("A page about Rust")).non_empty_description(),
            Some("A page about Rust")
        );
    }

    #[test]
    fn test_non_empty_description_blank() {
        assert_eq!(link(Some("   ")).non_empty_description(), None);
        assert_eq!(link(Some("")).non_empty_description(), None);
        assert_eq!(link(None).non_empty_description(), None);
    }

    #[test]
    fn test_validate_tag_name() {
        assert!(validate_tag_name("rust").is_ok());
        assert!(validate_tag_name("c++").is_ok());
        assert!(validate_tag_name(&"a".repeat(TAG_NAME_MAX_LENGTH)).is_ok());

        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("   ").is_err());
        assert!(validate_tag_name("bad\nname").is_err());

        let err = validate_tag_name(&"a".repeat(TAG_NAME_MAX_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("100 characters")));
    }

    #[test]
    fn test_attached_by_as_str() {
        assert_eq!(AttachedBy::Ai.as_str(), "ai");
        assert_eq!(AttachedBy::Human.to_string(), "human");
    }

    #[test]
    fn test_attached_by_serde() {
        let json = serde_json::to_string(&AttachedBy::Ai).unwrap();
        assert_eq!(json, "\"ai\"");
    }

    #[test]
    fn test_job_type_serde() {
        let json = serde_json::to_string(&JobType::TagInference).unwrap();
        assert_eq!(json, "\"tag_inference\"");
        assert_eq!(JobType::TagInference.default_priority(), 5);
    }

    #[test]
    fn test_job_status_serde() {
        let status: JobStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, JobStatus::Running);
    }
}
