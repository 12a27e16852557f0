use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    /// `ok`, or `degraded` when the alert store is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub stream_clients: usize,
    pub autofix: AutofixSummary,
}

#[derive(Debug, Serialize)]
pub struct AutofixSummary {
    pub enabled: bool,
    pub dry_run: bool,
    pub rules: usize,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Health> {
    let db_healthy = sysguard_db::health_check(&state.pool).await.is_ok();
    let autofix = state.engine.config();

    Json(Health {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        stream_clients: state.ws_manager.connection_count().await,
        autofix: AutofixSummary {
            enabled: autofix.enabled,
            dry_run: autofix.dry_run,
            rules: autofix.rules.len(),
        },
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
