#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use sysguard_api::config::ServerConfig;
use sysguard_api::router::build_app_router;
use sysguard_api::state::AppState;
use sysguard_core::autofix::{ActionError, ActionExecutor, AutoFixEngine, AutofixConfig};
use sysguard_core::metrics::{
    MetricsError, MetricsSnapshot, MetricsSource, ProcessInfo, StaticSource,
};

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        action_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

/// Records every action instead of touching the host.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<String>>,
}

impl ActionExecutor for RecordingExecutor {
    fn clear_cache(&self) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push("clear_cache".to_string());
        Ok(())
    }

    fn restart_service(&self, service: &str) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push(format!("restart_{service}"));
        Ok(())
    }

    fn kill_process(&self, pid: u32) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push(format!("kill_{pid}"));
        Ok(())
    }
}

/// A source whose backend is always down.
pub struct DownSource;

impl MetricsSource for DownSource {
    fn fetch(&self) -> Result<MetricsSnapshot, MetricsError> {
        Err(MetricsError::Unavailable("collector offline".to_string()))
    }

    fn top_processes(&self, _limit: usize) -> Result<Vec<ProcessInfo>, MetricsError> {
        Err(MetricsError::Unavailable("collector offline".to_string()))
    }
}

/// CPU at 91%, memory at 64%, disk at 30%, one busy process.
pub fn busy_host() -> Arc<dyn MetricsSource> {
    let snapshot = MetricsSnapshot::new()
        .with_group("cpu", [("usage_percent", 91.0), ("cores_logical", 4.0)])
        .with_group("memory", [("percent", 64.0)])
        .with_group("disk", [("percent", 30.0)])
        .with_value("cpu_percent", 91.0);
    let processes = vec![ProcessInfo {
        pid: 311,
        name: "ffmpeg".to_string(),
        user: "media".to_string(),
        cpu_percent: 88.0,
        memory_mb: 420,
        memory_percent: 2.6,
    }];
    Arc::new(StaticSource::new(snapshot).with_processes(processes))
}

/// Router over `busy_host()` with autofix disabled.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(
        pool,
        busy_host(),
        AutofixConfig::default(),
        Arc::new(RecordingExecutor::default()),
    )
}

pub fn build_test_app_with(
    pool: SqlitePool,
    source: Arc<dyn MetricsSource>,
    autofix: AutofixConfig,
    executor: Arc<dyn ActionExecutor>,
) -> Router {
    build_test_app_configured(pool, test_config(), source, autofix, executor)
}

pub fn build_test_app_configured(
    pool: SqlitePool,
    config: ServerConfig,
    source: Arc<dyn MetricsSource>,
    autofix: AutofixConfig,
    executor: Arc<dyn ActionExecutor>,
) -> Router {
    let state = test_state(pool, config.clone(), source, autofix, executor);
    build_app_router(state, &config).expect("test router")
}

pub fn test_state(
    pool: SqlitePool,
    config: ServerConfig,
    source: Arc<dyn MetricsSource>,
    autofix: AutofixConfig,
    executor: Arc<dyn ActionExecutor>,
) -> AppState {
    AppState::new(pool, config, source, AutoFixEngine::new(autofix, executor))
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}
