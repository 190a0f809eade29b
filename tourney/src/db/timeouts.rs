//! Database query timeout helpers
//!
//! Every manager call runs under one of these budgets so a stuck connection
//! surfaces as [`CoreError::Timeout`] instead of hanging the caller.

use crate::errors::{CoreError, CoreResult};
use std::{future::Future, time::Duration};
use tokio::time::timeout;

/// Default timeout for single queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for long-running operations such as a standings recompute (30 seconds)
pub const LONG_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute an operation with a timeout
///
/// # Example
///
/// ```no_run
/// use tourney::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> tourney::CoreResult<()> {
///
/// let row = with_timeout(DEFAULT_QUERY_TIMEOUT, async {
///     Ok(sqlx::query("SELECT 1").fetch_one(pool).await?)
/// })
/// .await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("Database operation timed out after {:?}", duration);
            Err(CoreError::Timeout(duration))
        }
    }
}

/// Execute an operation with the default query timeout (5 seconds)
pub async fn with_default_timeout<F, T>(future: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}

/// Execute a transaction with the transaction timeout (10 seconds)
pub async fn with_transaction_timeout<F, T>(future: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    with_timeout(DEFAULT_TRANSACTION_TIMEOUT, future).await
}

/// Execute a long-running operation with the extended timeout (30 seconds)
pub async fn with_long_timeout<F, T>(future: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    with_timeout(LONG_OPERATION_TIMEOUT, future).await
}
