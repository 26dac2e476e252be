//! Standardized store connection pool configuration
//!
//! Provides consistent pool settings for the loader and the query tools.

use crate::error::EtlResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://football.db";
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Store pool configuration
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Timeout for acquiring a connection
    pub acquire_timeout: Duration,
    /// How long SQLite waits on a locked database before failing
    pub busy_timeout: Duration,
    /// Maximum idle time before a connection is closed (`None` keeps it)
    pub idle_timeout: Option<Duration>,
    /// Attempts for operations that hit a transient busy/locked error
    pub retry_attempts: u32,
    /// Create the database file when it does not exist
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_connections: 4,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(300)), // 5 minutes
            retry_attempts: 3,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_connections),
            acquire_timeout: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
            busy_timeout: std::env::var("DB_BUSY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.busy_timeout),
            idle_timeout: defaults.idle_timeout,
            retry_attempts: std::env::var("DB_RETRY_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_attempts),
            create_if_missing: defaults.create_if_missing,
        }
    }

    /// Single long-lived connection. An in-memory SQLite database lives
    /// exactly as long as its connections, so it must never be recycled.
    pub fn in_memory() -> Self {
        Self {
            max_connections: 1,
            min_connections: 1,
            idle_timeout: None,
            ..Default::default()
        }
    }
}

/// Create a SQLite connection pool with standardized configuration
pub async fn create_pool(database_url: &str, config: &StoreConfig) -> EtlResult<SqlitePool> {
    info!(
        "Creating store pool: max={}, min={}, acquire_timeout={:?}",
        config.max_connections, config.min_connections, config.acquire_timeout
    );

    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(config.create_if_missing)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

    let mut pool_opts = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout);
    if config.idle_timeout.is_none() {
        pool_opts = pool_opts.max_lifetime(None);
    }

    let pool = pool_opts.connect_with(connect_opts).await?;

    info!("Store pool created successfully");
    Ok(pool)
}
