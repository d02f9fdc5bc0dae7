//! Error type shared by the hoard crates.

use thiserror::Error;

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by repositories, inference backends and the job worker.
#[derive(Error, Debug)]
pub enum Error {
    /// A query, transaction or migration failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The chat-completion backend could not be reached or rejected the request.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The job queue holds something the worker cannot process.
    #[error("Job error: {0}")]
    Job(String),

    /// A value was rejected before it reached storage.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::Inference("model timeout".to_string()).to_string(),
            "Inference error: model timeout"
        );
        assert_eq!(
            Error::Job("Unknown job type in queue: crawl".to_string()).to_string(),
            "Job error: Unknown job type in queue: crawl"
        );
        assert_eq!(
            Error::InvalidInput("empty tag name".to_string()).to_string(),
            "Invalid input: empty tag name"
        );
        assert_eq!(
            Error::Internal("shutdown channel closed".to_string()).to_string(),
            "Internal error: shutdown channel closed"
        );
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
