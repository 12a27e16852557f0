use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping subscribers every [`HEARTBEAT_INTERVAL`] until `cancel` fires.
/// Pings double as dead-connection sweeps.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while cancel
            .run_until_cancelled(ticker.tick())
            .await
            .is_some()
        {
            let alive = ws_manager.ping_all().await;
            if alive > 0 {
                tracing::trace!(alive, "Heartbeat sent");
            }
        }
        tracing::debug!("Heartbeat stopped");
    })
}
