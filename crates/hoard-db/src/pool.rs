//! PostgreSQL pool setup for the worker.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use hoard_core::{Error, Result};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Pool sizing. Each in-flight job holds at most one connection at a time,
/// so this should be at least `JOB_MAX_CONCURRENT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl PoolConfig {
    /// Reads `DATABASE_MAX_CONNECTIONS` (default 10, minimum 1).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
            .max(1);
        Self { max_connections }
    }
}

/// Connect a pool to `database_url`.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        duration_ms = start.elapsed().as_millis() as u64,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

/// Log pool occupancy; warns when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(subsystem = "db", component = "pool", pool_size = size, pool_idle = idle, "Pool status");
    if size > 0 && idle == 0 {
        warn!(subsystem = "db", component = "pool", pool_size = size, "No idle database connections");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_from_lookup() {
        assert_eq!(PoolConfig::from_lookup(|_| None), PoolConfig::default());

        let config = PoolConfig::from_lookup(|key| {
            (key == "DATABASE_MAX_CONNECTIONS").then(|| "25".to_string())
        });
        assert_eq!(config.max_connections, 25);
    }

    #[test]
    fn test_pool_config_rejects_zero_and_garbage() {
        let zero = PoolConfig::from_lookup(|_| Some("0".to_string()));
        assert_eq!(zero.max_connections, 1);

        let garbage = PoolConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(garbage.max_connections, DEFAULT_MAX_CONNECTIONS);
    }
}
