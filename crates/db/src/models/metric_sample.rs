use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sysguard_core::types::{DbId, Timestamp};

/// One headline utilization sample.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetricSample {
    pub id: DbId,
    pub recorded_at: Timestamp,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// DTO for inserting a sample.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMetricSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}
