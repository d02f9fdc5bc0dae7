//! OpenAI-compatible chat-completion backend.
//!
//! Works with any endpoint that speaks the `/chat/completions` protocol and
//! honors `response_format: {"type": "json_object"}`:
//!
//! - OpenAI cloud API
//! - Azure OpenAI
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM
//!
//! # Example
//!
//! ```rust,no_run
//! use hoard_inference::openai::{OpenAIBackend, OpenAIConfig};
//!
//! let config = OpenAIConfig {
//!     base_url: "http://localhost:11434/v1".to_string(), // Ollama
//!     api_key: None,
//!     gen_model: "llama3".to_string(),
//!     timeout_seconds: 120,
//! };
//! let backend = OpenAIBackend::new(config).unwrap();
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use error::{to_hoard_error, OpenAIErrorCode};
pub use types::*;
