//! The contract between the worker loop and the code that runs one job.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use hoard_core::{Job, JobType};

/// Receives `(percent, message)` updates from a running handler.
pub type ProgressFn = Box<dyn Fn(i32, Option<&str>) + Send + Sync>;

/// A claimed job plus the channel its handler reports progress on.
pub struct JobContext {
    job: Job,
    on_progress: Option<ProgressFn>,
}

impl JobContext {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            on_progress: None,
        }
    }

    /// Forward progress updates to `f`.
    pub fn with_progress_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(i32, Option<&str>) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// No-op when nobody is listening.
    pub fn report_progress(&self, percent: i32, message: Option<&str>) {
        if let Some(f) = &self.on_progress {
            f(percent, message);
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn job_id(&self) -> Uuid {
        self.job.id
    }

    pub fn payload(&self) -> Option<&JsonValue> {
        self.job.payload.as_ref()
    }
}

/// How a handler run ended. The queue's retry policy decides what a failure
/// means for the job row.
#[derive(Debug)]
pub enum JobResult {
    /// Stored on the job as its `result`.
    Success(Option<JsonValue>),
    /// Stored on the job as its `error_message`.
    Failed(String),
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success(_))
    }
}

/// Runs jobs of a single [`JobType`]. The worker routes each claimed job to
/// the handler registered for its type.
#[async_trait]
pub trait JobHandler: Send + Sync {
    fn job_type(&self) -> JobType;

    async fn execute(&self, ctx: JobContext) -> JobResult;
}
