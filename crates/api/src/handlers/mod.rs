//! Request handlers, grouped by resource.

pub mod alerts;
pub mod autofix;
pub mod metrics;

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};

/// Run blocking work (metrics collection, OS actions) on the blocking pool,
/// bounded by `timeout`. The core has no timeouts of its own.
///
/// On timeout the blocking task keeps running to completion in the
/// background; only the response is abandoned.
pub async fn run_blocking<T, F>(what: &str, timeout: Duration, f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) => Err(AppError::InternalError(format!("{what} task failed: {join_err}"))),
        Err(_) => Err(AppError::Timeout(what.to_string())),
    }
}

/// Wait up to `timeout` for a spawned task. On timeout the task is left
/// running; it owns whatever must outlive the request.
pub async fn await_detached<T>(
    what: &str,
    timeout: Duration,
    task: JoinHandle<AppResult<T>>,
) -> AppResult<T> {
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(AppError::InternalError(format!("{what} task failed: {join_err}"))),
        Err(_) => Err(AppError::Timeout(what.to_string())),
    }
}
