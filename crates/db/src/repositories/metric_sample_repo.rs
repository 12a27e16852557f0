//! Repository for the `metric_samples` table (append-only time-series).

use chrono::Utc;
use sqlx::SqlitePool;
use sysguard_core::types::Timestamp;

use crate::models::metric_sample::{CreateMetricSample, MetricSample};

const COLUMNS: &str = "id, recorded_at, cpu_percent, memory_percent, disk_percent";

pub struct MetricSampleRepo;

impl MetricSampleRepo {
    /// Insert a sample stamped with the current time.
    pub async fn insert(
        pool: &SqlitePool,
        input: &CreateMetricSample,
    ) -> Result<MetricSample, sqlx::Error> {
        Self::insert_at(pool, input, Utc::now()).await
    }

    /// Insert a sample with an explicit timestamp.
    pub async fn insert_at(
        pool: &SqlitePool,
        input: &CreateMetricSample,
        recorded_at: Timestamp,
    ) -> Result<MetricSample, sqlx::Error> {
        let query = format!(
            "INSERT INTO metric_samples (recorded_at, cpu_percent, memory_percent, disk_percent) \
             VALUES (?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MetricSample>(&query)
            .bind(recorded_at)
            .bind(input.cpu_percent)
            .bind(input.memory_percent)
            .bind(input.disk_percent)
            .fetch_one(pool)
            .await
    }

    /// Most recent samples first.
    pub async fn list_recent(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<MetricSample>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM metric_samples ORDER BY id DESC LIMIT ?");
        sqlx::query_as::<_, MetricSample>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete samples older than the given cutoff timestamp.
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_older_than(
        pool: &SqlitePool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM metric_samples WHERE julianday(recorded_at) < julianday(?)")
                .bind(cutoff)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
