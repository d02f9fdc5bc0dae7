//! Centralized default constants for hoard.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers. Place new constants in the matching section.

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Environment variable holding the chat-completion API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable enabling AI tagging ("true"/"1").
pub const ENV_OPENAI_ENABLED: &str = "OPENAI_ENABLED";

/// Environment variable overriding the API base URL.
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Environment variable overriding the tagging model.
pub const ENV_OPENAI_INFERENCE_MODEL: &str = "OPENAI_INFERENCE_MODEL";

/// Environment variable overriding the request timeout (seconds).
pub const ENV_OPENAI_TIMEOUT: &str = "OPENAI_TIMEOUT";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default model used for tag inference.
pub const INFERENCE_MODEL: &str = "gpt-3.5-turbo-0125";

/// Timeout for chat-completion requests in seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// JOB PROCESSING
// =============================================================================

/// Default maximum retry count for failed jobs.
pub const JOB_MAX_RETRIES: i32 = 3;

/// Default job worker poll interval in milliseconds.
pub const JOB_POLL_INTERVAL_MS: u64 = 500;

/// Default maximum concurrent jobs per worker.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Default job execution timeout in seconds (5 minutes).
pub const JOB_TIMEOUT_SECS: u64 = 300;

/// Default worker event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// DATABASE
// =============================================================================

/// Default database URL when `DATABASE_URL` is not set.
pub const DATABASE_URL: &str = "postgres://localhost/hoard";

/// Maximum tag name length in characters.
pub const TAG_NAME_MAX_LENGTH: usize = 100;
