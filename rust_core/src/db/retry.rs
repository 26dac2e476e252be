//! Store retry logic for transient failures
//!
//! SQLite reports a concurrent writer as `SQLITE_BUSY` / `SQLITE_LOCKED`.
//! Those, pool timeouts and I/O hiccups are retried with exponential
//! backoff; anything touching data integrity is returned immediately.

use crate::error::{EtlError, EtlResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 2_000;

/// Execute a store operation with automatic retry on transient failures
///
/// # Example
/// ```ignore
/// use pitchstats_core::db::retry::execute_with_retry;
///
/// let teams = execute_with_retry(|| store.team_names(), 3).await?;
/// ```
pub async fn execute_with_retry<F, Fut, T>(f: F, max_attempts: u32) -> EtlResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EtlResult<T>>,
{
    execute_with_retry_custom(f, max_attempts, BASE_BACKOFF_MS, MAX_BACKOFF_MS).await
}

/// Execute with retry and custom backoff configuration
pub async fn execute_with_retry_custom<F, Fut, T>(
    mut f: F,
    max_attempts: u32,
    base_backoff_ms: u64,
    max_backoff_ms: u64,
) -> EtlResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EtlResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_attempts && is_retriable_error(&e) => {
                let backoff_ms = backoff_delay_ms(attempt, base_backoff_ms, max_backoff_ms);
                warn!(
                    "Store operation failed (attempt {}/{}): {}. Retrying in {}ms",
                    attempt, max_attempts, e, backoff_ms
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Exponential delay before the retry that follows `attempt` (1-based),
/// capped at `max_backoff_ms`. Saturates instead of overflowing.
fn backoff_delay_ms(attempt: u32, base_backoff_ms: u64, max_backoff_ms: u64) -> u64 {
    base_backoff_ms
        .saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)))
        .min(max_backoff_ms)
}

/// Check if a store error is retriable
pub fn is_retriable_error(e: &EtlError) -> bool {
    let EtlError::Storage(err) = e else {
        return false;
    };

    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db_err) => {
            // SQLITE_BUSY = 5, SQLITE_LOCKED = 6
            let code_matches = db_err
                .code()
                .map(|code| code == "5" || code == "6")
                .unwrap_or(false);
            let message = db_err.message().to_lowercase();
            code_matches || message.contains("database is locked") || message.contains("busy")
        }
        _ => false,
    }
}
