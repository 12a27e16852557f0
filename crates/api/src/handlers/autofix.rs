//! On-demand autofix checks.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sysguard_core::autofix::TriggeredAction;
use sysguard_db::repositories::AlertRepo;

use super::await_detached;
use crate::error::{AppError, AppResult};
use crate::response::{data, DataResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub enabled: bool,
    pub dry_run: bool,
    pub triggered: Vec<TriggeredView>,
}

/// A triggered rule as returned to clients.
#[derive(Debug, Serialize)]
pub struct TriggeredView {
    #[serde(flatten)]
    pub triggered: TriggeredAction,
    /// `Rule '<name>' triggered: <action>`
    pub description: String,
}

impl From<TriggeredAction> for TriggeredView {
    fn from(triggered: TriggeredAction) -> Self {
        let description = triggered.description();
        Self {
            triggered,
            description,
        }
    }
}

/// POST /api/v1/autofix/check
///
/// Runs one engine cycle against a fresh snapshot and writes one alert row
/// per triggered rule. Concurrent requests queue behind each other.
///
/// The cycle runs detached from the request: the check lock and the alert
/// writes stay with it. A request that hits `ACTION_TIMEOUT_SECS` gets a 504,
/// and the next check waits until the timed-out cycle has written its alerts.
pub async fn run_check(State(state): State<AppState>) -> AppResult<Json<DataResponse<CheckResult>>> {
    let guard = state.check_lock.clone().lock_owned().await;

    let engine = state.engine.clone();
    let source = state.source.clone();
    let pool = state.pool.clone();
    let cycle = tokio::spawn(async move {
        let _guard = guard;
        let triggered = tokio::task::spawn_blocking(move || engine.run_cycle(source.as_ref()))
            .await
            .map_err(|e| AppError::InternalError(format!("autofix check task failed: {e}")))??;

        let written = AlertRepo::record_triggered(&pool, &triggered).await;
        tracing::info!(
            triggered = triggered.len(),
            alerts = written,
            "Autofix check complete"
        );
        Ok::<_, AppError>(triggered)
    });

    let triggered = await_detached("autofix check", state.config.action_timeout(), cycle).await?;

    let config = state.engine.config();
    Ok(data(CheckResult {
        enabled: config.enabled,
        dry_run: config.dry_run,
        triggered: triggered.into_iter().map(TriggeredView::from).collect(),
    }))
}
