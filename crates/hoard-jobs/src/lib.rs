//! # hoard-jobs
//!
//! Background job processing for hoard.
//!
//! This crate provides:
//! - Priority-based job claiming with concurrent workers
//! - Progress and lifecycle notifications via broadcast channels
//! - The tag inference handler
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hoard_jobs::{InferenceSettings, TagInferenceHandler, WorkerBuilder, WorkerConfig};
//!
//! let handler = TagInferenceHandler::new(bookmarks, tags, backend, InferenceSettings::from_env());
//! let worker = WorkerBuilder::new(jobs)
//!     .with_config(WorkerConfig::from_env())
//!     .with_handler(handler)
//!     .build()
//!     .await;
//!
//! let handle = worker.start();
//! let mut events = handle.events();
//! while let Ok(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//! handle.shutdown().await?;
//! ```

pub mod handler;
pub mod tag_inference;
pub mod worker;

// Re-export core types
pub use hoard_core::*;

pub use handler::{JobContext, JobHandler, JobResult, ProgressFn};
pub use tag_inference::{
    build_tagging_prompt, connect_tags, normalize_tags, parse_tag_response, ConnectedTags,
    InferenceSettings, TagInferenceError, TagInferenceHandler, TagInferenceOutcome,
    TagInferencePayload,
};
pub use worker::{JobWorker, WorkerBuilder, WorkerConfig, WorkerEvent, WorkerHandle};

/// Default maximum retries for failed jobs.
pub const DEFAULT_MAX_RETRIES: i32 = hoard_core::defaults::JOB_MAX_RETRIES;

/// Default polling interval for job processing (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = hoard_core::defaults::JOB_POLL_INTERVAL_MS;
