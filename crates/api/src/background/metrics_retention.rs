//! Hourly purge of old rows from `metric_samples`.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use sysguard_db::repositories::MetricSampleRepo;
use sysguard_db::DbPool;
use tokio_util::sync::CancellationToken;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete samples older than `retention_hours` once per hour until `cancel`
/// fires. The first pass runs immediately.
pub async fn run(pool: DbPool, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Sample retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sample retention job stopping");
                break;
            }
            _ = interval.tick() => {
                purge_once(&pool, retention_hours).await;
            }
        }
    }
}

/// One retention pass. Failures are logged; the next tick tries again.
///
/// A non-positive or unrepresentable window deletes nothing.
pub async fn purge_once(pool: &DbPool, retention_hours: i64) -> u64 {
    let Some(cutoff) = retention_cutoff(retention_hours) else {
        tracing::warn!(retention_hours, "Sample retention: invalid window, skipping purge");
        return 0;
    };

    match MetricSampleRepo::delete_older_than(pool, cutoff).await {
        Ok(0) => {
            tracing::debug!("Sample retention: nothing to purge");
            0
        }
        Ok(deleted) => {
            tracing::info!(deleted, %cutoff, "Sample retention: purged old rows");
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Sample retention: cleanup failed");
            0
        }
    }
}

fn retention_cutoff(retention_hours: i64) -> Option<chrono::DateTime<Utc>> {
    if retention_hours <= 0 {
        return None;
    }
    Utc::now().checked_sub_signed(TimeDelta::try_hours(retention_hours)?)
}
