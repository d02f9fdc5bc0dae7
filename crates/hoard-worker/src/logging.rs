//! Tracing subscriber setup.
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables daily-rotated file logging)
//!   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG    - standard env filter (default: "hoard_worker=debug,hoard_jobs=debug")

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "hoard_worker=debug,hoard_jobs=debug,hoard_inference=info";

/// Resolved logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub json: bool,
    pub file: Option<String>,
    pub ansi: Option<bool>,
}

impl LogOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|v| v == "json"),
            file: lookup("LOG_FILE").filter(|p| !p.is_empty()),
            ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
        }
    }
}

/// Split a log file path into (directory, file name) for the rolling appender.
fn split_log_path(path: &str) -> (&Path, &str) {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("hoard-worker.log");
    (dir, name)
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init(options: &LogOptions) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = options.file {
        let (dir, name) = split_log_path(path);
        let file_appender = tracing_appender::rolling::daily(dir, name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if options.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            // No ANSI in files unless asked for.
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(options.ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if options.json {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = options.ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_options_defaults() {
        let options = LogOptions::from_lookup(|_| None);
        assert_eq!(
            options,
            LogOptions {
                json: false,
                file: None,
                ansi: None
            }
        );
    }

    #[test]
    fn test_log_options_from_values() {
        let options = LogOptions::from_lookup(|key| match key {
            "LOG_FORMAT" => Some("json".to_string()),
            "LOG_FILE" => Some("/var/log/hoard/worker.log".to_string()),
            "LOG_ANSI" => Some("0".to_string()),
            _ => None,
        });
        assert!(options.json);
        assert_eq!(options.file.as_deref(), Some("/var/log/hoard/worker.log"));
        assert_eq!(options.ansi, Some(false));
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path("/var/log/hoard/worker.log");
        assert_eq!(dir, Path::new("/var/log/hoard"));
        assert_eq!(name, "worker.log");

        let (dir, name) = split_log_path("worker.log");
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "worker.log");
    }
}
