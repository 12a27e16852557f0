use std::sync::Arc;

use sysguard_core::autofix::{ActionExecutor, AutoFixEngine};
use sysguard_core::metrics::MetricsSource;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// The engine as the server holds it: the executor is chosen at startup.
pub type SharedEngine = AutoFixEngine<Arc<dyn ActionExecutor>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Alert and metric-sample store.
    pub pool: sysguard_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager.
    pub ws_manager: Arc<WsManager>,
    /// The one metrics source shared by handlers and the stream broadcaster.
    pub source: Arc<dyn MetricsSource>,
    pub engine: Arc<SharedEngine>,
    /// Held for the duration of an on-demand check so live actions never
    /// run concurrently.
    pub check_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        pool: sysguard_db::DbPool,
        config: ServerConfig,
        source: Arc<dyn MetricsSource>,
        engine: SharedEngine,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
            source,
            engine: Arc::new(engine),
            check_lock: Arc::new(Mutex::new(())),
        }
    }
}
