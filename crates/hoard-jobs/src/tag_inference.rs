//! Tag inference: ask a chat-completion model for hashtags describing a
//! bookmarked link and attach them to the bookmark.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use hoard_core::defaults::{ENV_OPENAI_API_KEY, ENV_OPENAI_ENABLED};
use hoard_core::{
    validate_tag_name, AttachedBy, BookmarkRepository, GenerationBackend, JobType, TagRepository,
};

use crate::handler::{JobContext, JobHandler, JobResult};

// =============================================================================
// SETTINGS
// =============================================================================

/// Whether AI tagging may run at all.
#[derive(Debug, Clone, Default)]
pub struct InferenceSettings {
    pub api_key: Option<String>,
    pub enabled: bool,
}

impl InferenceSettings {
    /// Load from `OPENAI_API_KEY` and `OPENAI_ENABLED`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_OPENAI_API_KEY).filter(|k| !k.trim().is_empty());
        let enabled = lookup(ENV_OPENAI_ENABLED)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);
        Self { api_key, enabled }
    }

    /// Settings with a key and the flag on.
    pub fn enabled_with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            enabled: true,
        }
    }

    /// Both the key and the flag are present.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

// =============================================================================
// PAYLOAD / RESPONSE
// =============================================================================

/// Job payload: `{"bookmarkId": "<id>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInferencePayload {
    pub bookmark_id: String,
}

impl TagInferencePayload {
    /// Validate a raw job payload.
    pub fn parse(job_id: Uuid, payload: Option<&JsonValue>) -> Result<Self, TagInferenceError> {
        let value = payload.ok_or_else(|| TagInferenceError::MalformedPayload {
            job_id,
            reason: "payload is missing".to_string(),
        })?;

        let parsed: Self = serde_json::from_value(value.clone()).map_err(|e| {
            TagInferenceError::MalformedPayload {
                job_id,
                reason: e.to_string(),
            }
        })?;

        if parsed.bookmark_id.trim().is_empty() {
            return Err(TagInferenceError::MalformedPayload {
                job_id,
                reason: "bookmarkId is empty".to_string(),
            });
        }
        Ok(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    tags: Vec<String>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// A failed tag inference attempt. Display renders `[inference][<job id>] <cause>`.
#[derive(Debug, Error)]
pub enum TagInferenceError {
    #[error("[inference][{job_id}] Malformed job payload: {reason}")]
    MalformedPayload { job_id: Uuid, reason: String },

    #[error("[inference][{job_id}] Bookmark {bookmark_id} not found")]
    BookmarkNotFound { job_id: Uuid, bookmark_id: String },

    #[error("[inference][{job_id}] Bookmark {bookmark_id} has no link")]
    LinkNotFound { job_id: Uuid, bookmark_id: String },

    #[error("[inference][{job_id}] Link of bookmark {bookmark_id} has no description to infer tags from")]
    MissingDescription { job_id: Uuid, bookmark_id: String },

    #[error("[inference][{job_id}] No content in the model response")]
    NoResponseContent { job_id: Uuid },

    #[error("[inference][{job_id}] The model returned a malformed response: {reason}")]
    MalformedResponse { job_id: Uuid, reason: String },

    #[error("[inference][{job_id}] Inference request failed: {source}")]
    Inference {
        job_id: Uuid,
        source: hoard_core::Error,
    },

    #[error("[inference][{job_id}] Storage operation failed: {source}")]
    Storage {
        job_id: Uuid,
        source: hoard_core::Error,
    },
}

impl TagInferenceError {
    /// The job this error belongs to.
    pub fn job_id(&self) -> Uuid {
        match self {
            Self::MalformedPayload { job_id, .. }
            | Self::BookmarkNotFound { job_id, .. }
            | Self::LinkNotFound { job_id, .. }
            | Self::MissingDescription { job_id, .. }
            | Self::NoResponseContent { job_id }
            | Self::MalformedResponse { job_id, .. }
            | Self::Inference { job_id, .. }
            | Self::Storage { job_id, .. } => *job_id,
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// The fixed tagging prompt, sent as the only (system) message.
pub fn build_tagging_prompt(url: &str, description: &str) -> String {
    format!(
        r#"You are helping a read-it-later app tag saved links automatically.
Read the link details below and suggest tags that capture the main topics, themes, and ideas.
Mix broad categories with specific keywords. If the site is widely known, you may add a tag for the site itself.
Tags must be lowercase and must not contain spaces. Leave out tags that are too vague to be useful.
Aim for 3-5 tags. If nothing fits, return an empty list. Ignore cookie banners and privacy notices.
Respond with a JSON object whose "tags" key holds the list of tags.
----
URL: {url}
Description: {description}"#
    )
}

/// Parse the model's reply into its raw tag list.
pub fn parse_tag_response(job_id: Uuid, raw: &str) -> Result<Vec<String>, TagInferenceError> {
    serde_json::from_str::<TagResponse>(raw)
        .map(|r| r.tags)
        .map_err(|e| TagInferenceError::MalformedResponse {
            job_id,
            reason: format!("{} (response: {})", e, raw),
        })
}

/// Strip one leading `#` and dedupe while keeping first-seen order.
///
/// Names that storage would reject (blank, too long, control characters) are
/// dropped here so a well-formed reply never fails halfway through
/// [`connect_tags`].
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref().trim();
            let name = tag.strip_prefix('#').unwrap_or(tag).trim();
            match validate_tag_name(name) {
                Ok(()) => Some(name.to_string()),
                Err(e) if !name.is_empty() => {
                    warn!(subsystem = "jobs", component = "tag_inference", error = %e, "Dropping inferred tag");
                    None
                }
                Err(_) => None,
            }
        })
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Outcome of [`connect_tags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedTags {
    /// Ids of every tag now attached, existing ones first.
    pub tag_ids: Vec<String>,
    /// How many tags had to be created.
    pub created: usize,
}

/// Reuse the user's existing tags, create the missing ones, and attach all of
/// them to the bookmark as `ai`.
///
/// Creates run concurrently and are awaited together; so do the attaches.
pub async fn connect_tags(
    tags: &dyn TagRepository,
    user_id: &str,
    bookmark_id: &str,
    names: &[String],
) -> hoard_core::Result<ConnectedTags> {
    if names.is_empty() {
        return Ok(ConnectedTags {
            tag_ids: Vec::new(),
            created: 0,
        });
    }

    let existing = tags.find_by_names(user_id, names).await?;
    let existing_names: HashSet<&str> = existing.iter().map(|t| t.name.as_str()).collect();

    let missing: Vec<&String> = names
        .iter()
        .filter(|name| !existing_names.contains(name.as_str()))
        .collect();

    let created = try_join_all(missing.iter().map(|name| tags.create(user_id, name))).await?;

    let mut seen = HashSet::new();
    let tag_ids: Vec<String> = existing
        .iter()
        .chain(created.iter())
        .map(|t| t.id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect();

    try_join_all(
        tag_ids
            .iter()
            .map(|tag_id| tags.attach(bookmark_id, tag_id, AttachedBy::Ai)),
    )
    .await?;

    Ok(ConnectedTags {
        tag_ids,
        created: created.len(),
    })
}

// =============================================================================
// HANDLER
// =============================================================================

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagInferenceOutcome {
    /// AI integration is not configured; nothing was read or written.
    Skipped,
    /// Tags were inferred and attached.
    Tagged {
        tags: Vec<String>,
        created: usize,
        attached: usize,
    },
}

impl TagInferenceOutcome {
    /// Result payload stored on the job.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Skipped => json!({ "skipped": true }),
            Self::Tagged {
                tags,
                created,
                attached,
            } => json!({
                "tags": tags,
                "created": created,
                "attached": attached,
            }),
        }
    }
}

/// Handler for [`JobType::TagInference`] jobs.
pub struct TagInferenceHandler {
    bookmarks: Arc<dyn BookmarkRepository>,
    tags: Arc<dyn TagRepository>,
    backend: Arc<dyn GenerationBackend>,
    settings: InferenceSettings,
}

impl TagInferenceHandler {
    pub fn new(
        bookmarks: Arc<dyn BookmarkRepository>,
        tags: Arc<dyn TagRepository>,
        backend: Arc<dyn GenerationBackend>,
        settings: InferenceSettings,
    ) -> Self {
        Self {
            bookmarks,
            tags,
            backend,
            settings,
        }
    }

    /// Run the full inference pipeline for one job.
    pub async fn infer(
        &self,
        job_id: Uuid,
        payload: Option<&JsonValue>,
    ) -> Result<TagInferenceOutcome, TagInferenceError> {
        let TagInferencePayload { bookmark_id } = TagInferencePayload::parse(job_id, payload)?;

        if !self.settings.is_configured() {
            debug!(%bookmark_id, "AI tagging not configured, skipping");
            return Ok(TagInferenceOutcome::Skipped);
        }

        let found = self
            .bookmarks
            .find_with_link(&bookmark_id)
            .await
            .map_err(|source| TagInferenceError::Storage { job_id, source })?
            .ok_or_else(|| TagInferenceError::BookmarkNotFound {
                job_id,
                bookmark_id: bookmark_id.clone(),
            })?;

        let link = found
            .link
            .as_ref()
            .ok_or_else(|| TagInferenceError::LinkNotFound {
                job_id,
                bookmark_id: bookmark_id.clone(),
            })?;

        let description =
            link.non_empty_description()
                .ok_or_else(|| TagInferenceError::MissingDescription {
                    job_id,
                    bookmark_id: bookmark_id.clone(),
                })?;

        let prompt = build_tagging_prompt(&link.url, description);
        let raw = self
            .backend
            .generate_json(&prompt)
            .await
            .map_err(|source| TagInferenceError::Inference { job_id, source })?
            .ok_or(TagInferenceError::NoResponseContent { job_id })?;

        let tags = normalize_tags(parse_tag_response(job_id, &raw)?);
        debug!(%bookmark_id, model = self.backend.model_name(), ?tags, "Inferred tags");

        let connected = connect_tags(
            self.tags.as_ref(),
            &found.bookmark.user_id,
            &bookmark_id,
            &tags,
        )
        .await
        .map_err(|source| TagInferenceError::Storage { job_id, source })?;

        Ok(TagInferenceOutcome::Tagged {
            attached: connected.tag_ids.len(),
            created: connected.created,
            tags,
        })
    }
}

#[async_trait]
impl JobHandler for TagInferenceHandler {
    fn job_type(&self) -> JobType {
        JobType::TagInference
    }

    #[instrument(
        skip(self, ctx),
        fields(subsystem = "jobs", component = "tag_inference", op = "execute", job_id = %ctx.job_id())
    )]
    async fn execute(&self, ctx: JobContext) -> JobResult {
        let start = Instant::now();
        ctx.report_progress(10, Some("Inferring tags..."));

        match self.infer(ctx.job_id(), ctx.payload()).await {
            Ok(outcome) => {
                if let TagInferenceOutcome::Tagged {
                    tags,
                    created,
                    attached,
                } = &outcome
                {
                    info!(
                        tag_count = tags.len(),
                        created,
                        attached,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Tag inference completed"
                    );
                }
                ctx.report_progress(100, Some("Done"));
                JobResult::Success(Some(outcome.to_json()))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tag inference failed"
                );
                JobResult::Failed(e.to_string())
            }
        }
    }
}
