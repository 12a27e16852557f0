pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{alerts, autofix, metrics};
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                 WebSocket metric stream
/// /metrics            current snapshot + top processes (GET)
/// /alerts             alert log, newest first (GET, ?limit=)
/// /samples            recorded metric samples, newest first (GET, ?limit=)
/// /autofix/check      run one autofix cycle (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/metrics", get(metrics::get_metrics))
        .route("/alerts", get(alerts::list_alerts))
        .route("/samples", get(alerts::list_samples))
        .route("/autofix/check", post(autofix::run_check))
}
