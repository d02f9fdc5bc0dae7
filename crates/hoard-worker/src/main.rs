//! hoard background worker.
//!
//! Connects to PostgreSQL, applies migrations, and consumes the job queue
//! until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use hoard_core::defaults::{DATABASE_URL, JOB_TIMEOUT_SECS};
use hoard_db::{
    log_pool_metrics, Database, PgBookmarkRepository, PgJobRepository, PgTagRepository, PoolConfig,
};
use hoard_inference::OpenAIBackend;
use hoard_jobs::{InferenceSettings, TagInferenceHandler, WorkerBuilder, WorkerConfig, WorkerEvent};

mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_options = logging::LogOptions::from_env();
    let _file_guard = logging::init(&log_options);

    info!(
        log_format = if log_options.json { "json" } else { "text" },
        log_file = log_options.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());

    let db = Database::connect_with_config(&database_url, PoolConfig::from_env())
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to run migrations")?;
    info!(subsystem = "db", "Migrations applied");
    log_pool_metrics(db.pool());

    let settings = InferenceSettings::from_env();
    let backend = OpenAIBackend::from_env().context("failed to create inference backend")?;
    if settings.is_configured() {
        if !backend.health_check().await.unwrap_or(false) {
            warn!(
                subsystem = "inference",
                base_url = %backend.config().base_url,
                "Inference endpoint did not pass health check; jobs may fail"
            );
        }
    } else {
        info!(
            subsystem = "inference",
            "AI tagging not configured (OPENAI_API_KEY / OPENAI_ENABLED); tag inference jobs will be skipped"
        );
    }

    let pool = db.pool().clone();
    let handler = TagInferenceHandler::new(
        Arc::new(PgBookmarkRepository::new(pool.clone())),
        Arc::new(PgTagRepository::new(pool.clone())),
        Arc::new(backend),
        settings,
    );

    let worker_config = WorkerConfig::from_env();
    let worker = WorkerBuilder::new(Arc::new(PgJobRepository::new(pool)))
        .with_config(worker_config)
        .with_handler(handler)
        .build()
        .await;

    match worker.pending_count().await {
        Ok(pending) => info!(subsystem = "jobs", pending, "Job queue ready"),
        Err(e) => warn!(subsystem = "jobs", error = %e, "Could not count pending jobs"),
    }

    let handle = worker.start();
    let mut events = handle.events();

    let interrupted = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("Shutdown signal received");
                break true;
            }
            event = events.recv() => match event {
                Ok(WorkerEvent::WorkerStopped) | Err(RecvError::Closed) => break false,
                Ok(WorkerEvent::JobProgress { job_id, percent, message }) => {
                    debug!(subsystem = "jobs", %job_id, percent, message = message.as_deref(), "Job progress");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(subsystem = "jobs", skipped, "Worker event stream lagged");
                }
            }
        }
    };

    if interrupted {
        handle.shutdown().await?;
        // Let the in-flight batch finish before the runtime drops it.
        let drained = tokio::time::timeout(Duration::from_secs(JOB_TIMEOUT_SECS), async {
            loop {
                match events.recv().await {
                    Ok(WorkerEvent::WorkerStopped) | Err(RecvError::Closed) => break,
                    _ => {}
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(subsystem = "jobs", "Timed out waiting for in-flight jobs");
        }
    }

    info!("hoard-worker exiting");
    Ok(())
}
