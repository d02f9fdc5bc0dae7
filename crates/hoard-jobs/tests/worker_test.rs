//! Worker loop tests against an in-memory job queue.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use hoard_jobs::{
    Job, JobContext, JobHandler, JobRepository, JobResult, JobStatus, JobType,
    WorkerBuilder, WorkerConfig, WorkerEvent,
};

#[derive(Default)]
struct InMemoryQueue {
    jobs: Mutex<Vec<Job>>,
}

impl InMemoryQueue {
    fn status_of(&self, job_id: Uuid) -> (JobStatus, i32, Option<String>) {
        let jobs = self.jobs.lock().unwrap();
        let job = jobs.iter().find(|j| j.id == job_id).expect("job exists");
        (job.status, job.retry_count, job.error_message.clone())
    }
}

#[async_trait]
impl JobRepository for InMemoryQueue {
    async fn queue(
        &self,
        job_type: JobType,
        priority: i32,
        payload: Option<JsonValue>,
    ) -> hoard_core::Result<Uuid> {
        let id = Uuid::now_v7();
        self.jobs.lock().unwrap().push(Job {
            id,
            job_type,
            status: JobStatus::Pending,
            priority,
            payload,
            result: None,
            error_message: None,
            retry_count: 0,
            max_retries: 1,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        });
        Ok(id)
    }

    async fn claim_next_for_types(&self, job_types: &[JobType]) -> hoard_core::Result<Option<Job>> {
        let mut jobs = self.jobs.lock().unwrap();
        let next = jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::Pending)
            .filter(|j| job_types.is_empty() || job_types.contains(&j.job_type))
            .max_by_key(|j| j.priority);
        Ok(next.map(|job| {
            job.status = JobStatus::Running;
            job.started_at = Some(Utc::now());
            job.clone()
        }))
    }

    async fn complete(&self, job_id: Uuid, result: Option<JsonValue>) -> hoard_core::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = JobStatus::Completed;
            job.result = result;
            job.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn fail(&self, job_id: Uuid, error: &str) -> hoard_core::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.error_message = Some(error.to_string());
            if job.retry_count < job.max_retries {
                job.retry_count += 1;
                job.status = JobStatus::Pending;
            } else {
                job.status = JobStatus::Failed;
                job.completed_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> hoard_core::Result<Option<Job>> {
        Ok(self.jobs.lock().unwrap().iter().find(|j| j.id == job_id).cloned())
    }

    async fn pending_count(&self) -> hoard_core::Result<i64> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .count() as i64)
    }
}

struct Succeeds;

#[async_trait]
impl JobHandler for Succeeds {
    fn job_type(&self) -> JobType {
        JobType::TagInference
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        ctx.report_progress(50, Some("working"));
        JobResult::Success(Some(serde_json::json!({ "ok": true })))
    }
}

struct AlwaysFails;

#[async_trait]
impl JobHandler for AlwaysFails {
    fn job_type(&self) -> JobType {
        JobType::TagInference
    }

    async fn execute(&self, _ctx: JobContext) -> JobResult {
        JobResult::Failed("boom".to_string())
    }
}

struct Sleeps;

#[async_trait]
impl JobHandler for Sleeps {
    fn job_type(&self) -> JobType {
        JobType::TagInference
    }

    async fn execute(&self, _ctx: JobContext) -> JobResult {
        tokio::time::sleep(Duration::from_secs(5)).await;
        JobResult::Success(None)
    }
}

async fn wait_for<F>(mut events: tokio::sync::broadcast::Receiver<WorkerEvent>, mut pred: F)
where
    F: FnMut(&WorkerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Ok(event) = events.recv().await {
            if pred(&event) {
                return;
            }
        }
    })
    .await
    .expect("timed out waiting for worker event");
}

fn fast_config() -> WorkerConfig {
    WorkerConfig::default().with_poll_interval(10)
}

#[tokio::test]
async fn test_worker_completes_job() {
    let queue = Arc::new(InMemoryQueue::default());
    let job_id = queue
        .queue(JobType::TagInference, 5, None)
        .await
        .unwrap();

    let worker = WorkerBuilder::new(queue.clone())
        .with_config(fast_config())
        .with_handler(Succeeds)
        .build()
        .await;
    let handle = worker.start();

    let mut progress = Vec::new();
    wait_for(handle.events(), |e| match e {
        WorkerEvent::JobProgress { job_id: id, percent, .. } if *id == job_id => {
            progress.push(*percent);
            false
        }
        WorkerEvent::JobCompleted { job_id: id, .. } => *id == job_id,
        _ => false,
    })
    .await;

    assert_eq!(progress, vec![50]);
    assert_eq!(queue.status_of(job_id).0, JobStatus::Completed);
    let stored = queue.get(job_id).await.unwrap().unwrap();
    assert_eq!(stored.result, Some(serde_json::json!({ "ok": true })));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worker_retries_then_fails() {
    let queue = Arc::new(InMemoryQueue::default());
    let job_id = queue
        .queue(JobType::TagInference, 5, None)
        .await
        .unwrap();

    let worker = WorkerBuilder::new(queue.clone())
        .with_config(fast_config())
        .with_handler(AlwaysFails)
        .build()
        .await;
    let handle = worker.start();

    // max_retries = 1: one retry, then terminal failure.
    let mut failures = 0;
    wait_for(handle.events(), |e| {
        if matches!(e, WorkerEvent::JobFailed { .. }) {
            failures += 1;
        }
        failures == 2
    })
    .await;

    let (status, retry_count, error) = queue.status_of(job_id);
    assert_eq!(status, JobStatus::Failed);
    assert_eq!(retry_count, 1);
    assert_eq!(error.as_deref(), Some("boom"));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worker_enforces_job_timeout() {
    let queue = Arc::new(InMemoryQueue::default());
    let job_id = queue
        .queue(JobType::TagInference, 5, None)
        .await
        .unwrap();

    let worker = WorkerBuilder::new(queue.clone())
        .with_config(fast_config().with_job_timeout(0))
        .with_handler(Sleeps)
        .build()
        .await;
    let handle = worker.start();

    wait_for(handle.events(), |e| {
        matches!(e, WorkerEvent::JobFailed { error, .. } if error.contains("timeout"))
    })
    .await;

    let (_, _, error) = queue.status_of(job_id);
    assert!(error.unwrap().contains("timeout"));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disabled_worker_claims_nothing() {
    let queue = Arc::new(InMemoryQueue::default());
    queue.queue(JobType::TagInference, 5, None).await.unwrap();

    let worker = WorkerBuilder::new(queue.clone())
        .with_config(fast_config().with_enabled(false))
        .with_handler(Succeeds)
        .build()
        .await;
    let _handle = worker.start();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(queue.pending_count().await.unwrap(), 1);
}
