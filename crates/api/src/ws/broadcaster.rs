//! Periodic metric pushes to every connected WebSocket client.
//!
//! Message shape:
//!
//! ```json
//! {"type": "metrics", "metrics": {...}, "processes": [...], "timestamp": "..."}
//! ```

use axum::extract::ws::Message;
use chrono::Utc;
use serde::Serialize;
use sysguard_core::metric_names::MSG_TYPE_METRICS;
use sysguard_core::metrics::{MetricsSnapshot, ProcessInfo};
use sysguard_core::types::Timestamp;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::handlers::metrics::{collect_payload, MetricsPayload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StreamMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub metrics: &'a MetricsSnapshot,
    pub processes: &'a [ProcessInfo],
    pub timestamp: Timestamp,
}

/// Serialize a payload as a `metrics` text frame.
pub fn encode(payload: &MetricsPayload, timestamp: Timestamp) -> Result<Message, serde_json::Error> {
    let json = serde_json::to_string(&StreamMessage {
        kind: MSG_TYPE_METRICS,
        metrics: &payload.metrics,
        processes: &payload.processes,
        timestamp,
    })?;
    Ok(Message::Text(json.into()))
}

/// Collect fresh metrics and encode them.
pub async fn metrics_message(state: &AppState) -> AppResult<Message> {
    let payload = collect_payload(state).await?;
    encode(&payload, Utc::now()).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Push metrics every `STREAM_INTERVAL_MS` until `cancel` fires. Ticks with
/// no connected clients skip collection entirely.
pub fn start_broadcaster(state: AppState, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.stream_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            interval_ms = state.config.stream_interval_ms,
            "Metrics broadcaster started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Metrics broadcaster stopping");
                    break;
                }
                _ = interval.tick() => {
                    if state.ws_manager.connection_count().await == 0 {
                        continue;
                    }
                    match metrics_message(&state).await {
                        Ok(msg) => {
                            let delivered = state.ws_manager.broadcast(msg).await;
                            tracing::trace!(delivered, "Metrics pushed");
                        }
                        Err(e) => tracing::warn!(error = %e, "Metrics broadcast skipped"),
                    }
                }
            }
        }
    })
}
