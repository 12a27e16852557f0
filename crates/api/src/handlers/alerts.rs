//! Handlers for the alert log and recorded metric samples.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use sysguard_core::error::CoreError;
use sysguard_db::models::alert::Alert;
use sysguard_db::models::metric_sample::MetricSample;
use sysguard_db::repositories::{AlertRepo, MetricSampleRepo};

use crate::error::{AppError, AppResult};
use crate::response::{data, DataResponse};
use crate::state::AppState;

pub const DEFAULT_ALERT_LIMIT: i64 = 10;
pub const MAX_ALERT_LIMIT: i64 = 500;
pub const DEFAULT_SAMPLE_LIMIT: i64 = 60;
pub const MAX_SAMPLE_LIMIT: i64 = 1000;

/// `?limit=N`
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// Resolve an optional limit against its default and inclusive upper bound.
pub fn validate_limit(limit: Option<i64>, default: i64, max: i64) -> Result<i64, CoreError> {
    match limit {
        None => Ok(default),
        Some(n) if (1..=max).contains(&n) => Ok(n),
        Some(n) => Err(CoreError::Validation(format!(
            "limit must be between 1 and {max}, got {n}"
        ))),
    }
}

fn limit_param(params: Result<Query<LimitParams>, QueryRejection>) -> AppResult<Option<i64>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(params.limit)
}

/// GET /api/v1/alerts?limit=N
///
/// Most recent alerts first.
pub async fn list_alerts(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let limit = validate_limit(limit_param(params)?, DEFAULT_ALERT_LIMIT, MAX_ALERT_LIMIT)?;
    let alerts = AlertRepo::list_recent(&state.pool, limit).await?;
    Ok(data(alerts))
}

/// GET /api/v1/samples?limit=N
///
/// Most recent metric samples first.
pub async fn list_samples(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<MetricSample>>>> {
    let limit = validate_limit(limit_param(params)?, DEFAULT_SAMPLE_LIMIT, MAX_SAMPLE_LIMIT)?;
    let samples = MetricSampleRepo::list_recent(&state.pool, limit).await?;
    Ok(data(samples))
}
