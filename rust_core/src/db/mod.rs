//! Relational store access.
//!
//! This module provides:
//! - An explicit `Store` handle owned by the caller (no process-wide engine)
//! - Standardized pool configuration (`pool`)
//! - Schema creation (`schema`)
//! - Retry with backoff for transient busy/locked failures (`retry`)
//! - Liveness and row-count inspection (`health`)

pub mod health;
pub mod pool;
pub mod retry;
pub mod schema;

pub use health::{check_store_health, table_counts, TableCounts};
pub use pool::{create_pool, StoreConfig, DEFAULT_DATABASE_URL, IN_MEMORY_URL};
pub use schema::{ensure_schema, SCHEMA_TABLES};

use crate::error::EtlResult;
use sqlx::SqlitePool;
use tracing::info;

/// Handle to the relational store.
///
/// Cloning is cheap (the pool is reference counted). Connections are
/// acquired per operation and returned to the pool on every exit path.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    retry_attempts: u32,
}

impl Store {
    /// Open (and create if needed) the store at `database_url`.
    pub async fn connect(database_url: &str, config: &StoreConfig) -> EtlResult<Self> {
        let pool = retry::execute_with_retry(
            || create_pool(database_url, config),
            config.retry_attempts.max(1),
        )
        .await?;
        info!("Connected to store at {}", database_url);
        Ok(Self {
            pool,
            retry_attempts: config.retry_attempts.max(1),
        })
    }

    /// Fresh private in-memory store.
    pub async fn in_memory() -> EtlResult<Self> {
        Self::connect(IN_MEMORY_URL, &StoreConfig::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Attempts allowed for read operations that hit a transient failure.
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// Team names for the dashboard filter, alphabetical.
    pub async fn team_names(&self) -> EtlResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT DISTINCT name FROM team ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Release every pooled connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_stores_are_isolated() {
        let a = Store::in_memory().await.unwrap();
        let b = Store::in_memory().await.unwrap();
        ensure_schema(&a).await.unwrap();

        assert!(table_counts(&a).await.is_ok());
        assert!(table_counts(&b).await.is_err());
    }

    #[tokio::test]
    async fn test_team_names_sorted() {
        let store = Store::in_memory().await.unwrap();
        ensure_schema(&store).await.unwrap();

        for statement in [
            "INSERT INTO competition (id, name) VALUES (1, 'Premier League')",
            "INSERT INTO season (id, label) VALUES (1, '2024-2025')",
            "INSERT INTO team (name, competition_id, season_id) VALUES ('Wolves', 1, 1)",
            "INSERT INTO team (name, competition_id, season_id) VALUES ('Arsenal', 1, 1)",
        ] {
            sqlx::query(statement).execute(store.pool()).await.unwrap();
        }

        assert_eq!(store.team_names().await.unwrap(), vec!["Arsenal", "Wolves"]);
        store.close().await;
    }
}
