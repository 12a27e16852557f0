//! Handlers for live host metrics.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sysguard_core::metrics::{MetricsSnapshot, ProcessInfo};

use super::run_blocking;
use crate::error::AppResult;
use crate::response::{data, DataResponse};
use crate::state::AppState;

/// Rows returned by the polling endpoint and each stream push.
pub const TOP_PROCESS_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct MetricsPayload {
    pub metrics: MetricsSnapshot,
    pub processes: Vec<ProcessInfo>,
}

/// GET /api/v1/metrics
///
/// Current nested snapshot plus the top processes by CPU.
pub async fn get_metrics(State(state): State<AppState>) -> AppResult<Json<DataResponse<MetricsPayload>>> {
    let payload = collect_payload(&state).await?;
    Ok(data(payload))
}

/// Fetch a snapshot and process list on the blocking pool.
pub async fn collect_payload(state: &AppState) -> AppResult<MetricsPayload> {
    let source = state.source.clone();
    let (metrics, processes) = run_blocking("metrics fetch", state.config.action_timeout(), move || {
        let metrics = source.fetch()?;
        let processes = source.top_processes(TOP_PROCESS_LIMIT)?;
        Ok::<_, sysguard_core::metrics::MetricsError>((metrics, processes))
    })
    .await??;

    Ok(MetricsPayload { metrics, processes })
}
