//! Scripted generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hoard_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new().with_fixed_response(r#"{"tags":["rust"]}"#);
//! let reply = backend.generate_json("prompt").await.unwrap();
//! assert_eq!(backend.generate_call_count(), 1);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use hoard_core::{Error, GenerationBackend, Result};

/// What the mock replies with.
#[derive(Debug, Clone)]
enum MockReply {
    Content(String),
    Empty,
    Failure(String),
}

/// Generation backend that returns a scripted reply and records every prompt.
#[derive(Clone)]
pub struct MockGenerationBackend {
    reply: MockReply,
    model: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationBackend {
    /// Create a mock that replies with an empty tag list.
    pub fn new() -> Self {
        Self {
            reply: MockReply::Content(r#"{"tags": []}"#.to_string()),
            model: "mock-model".to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with this content.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.reply = MockReply::Content(response.into());
        self
    }

    /// Reply with no content (`Ok(None)`).
    pub fn with_empty_response(mut self) -> Self {
        self.reply = MockReply::Empty;
        self
    }

    /// Fail every call with `Error::Inference(message)`.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.reply = MockReply::Failure(message.into());
        self
    }

    fn log(&self) -> MutexGuard<'_, Vec<String>> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.log().clone()
    }

    /// Number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        self.log().len()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate_json(&self, system: &str) -> Result<Option<String>> {
        self.log().push(system.to_string());

        match &self.reply {
            MockReply::Content(content) => Ok(Some(content.clone())),
            MockReply::Empty => Ok(None),
            MockReply::Failure(message) => Err(Error::Inference(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_response_and_call_log() {
        let backend = MockGenerationBackend::new().with_fixed_response(r#"{"tags":["a"]}"#);
        let reply = backend.generate_json("first").await.unwrap();
        assert_eq!(reply.as_deref(), Some(r#"{"tags":["a"]}"#));

        backend.generate_json("second").await.unwrap();
        assert_eq!(backend.generate_call_count(), 2);
        assert_eq!(backend.prompts(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_empty_response() {
        let backend = MockGenerationBackend::new().with_empty_response();
        assert!(backend.generate_json("p").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure() {
        let backend = MockGenerationBackend::new().with_failure("rate limited");
        let err = backend.generate_json("p").await.unwrap_err();
        assert!(matches!(err, Error::Inference(ref m) if m == "rate limited"));
        assert_eq!(backend.generate_call_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let backend = MockGenerationBackend::new();
        let clone = backend.clone();
        clone.generate_json("p").await.unwrap();
        assert_eq!(backend.generate_call_count(), 1);
    }
}
