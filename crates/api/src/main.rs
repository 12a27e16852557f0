//! `sysguard-api` -- HTTP and WebSocket front end for SysGuard.
//!
//! Serves live metrics, the alert log and on-demand autofix checks, and
//! streams metrics to WebSocket clients. See [`ServerConfig::from_env`] for
//! environment variables.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sysguard_agent::actions::SystemActions;
use sysguard_agent::collector::SystemCollector;
use sysguard_api::background::metrics_retention;
use sysguard_api::config::ServerConfig;
use sysguard_api::router::build_app_router;
use sysguard_api::state::AppState;
use sysguard_api::ws;
use sysguard_core::autofix::{ActionExecutor, AutoFixEngine};
use sysguard_core::config::{self, SysguardConfig};
use sysguard_core::metrics::MetricsSource;
use sysguard_db::DbPool;

const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sysguard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let server_config = ServerConfig::from_env()?;
    tracing::info!(host = %server_config.host, port = %server_config.port, "Loaded server configuration");

    let sysguard_config = load_rules(&server_config.config_path)?;

    // --- Database ---
    let pool = open_pool(&server_config, &sysguard_config).await?;

    // --- Metrics source and engine ---
    let collector = tokio::task::spawn_blocking(|| {
        let collector = SystemCollector::new();
        collector.warm_up().map(|()| collector)
    })
    .await??;
    let source: Arc<dyn MetricsSource> = Arc::new(collector);

    let executor: Arc<dyn ActionExecutor> = Arc::new(SystemActions::new());
    let engine = AutoFixEngine::new(sysguard_config.autofix, executor);

    let state = AppState::new(pool.clone(), server_config.clone(), source, engine);

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(state.ws_manager.clone(), cancel.clone());
    let broadcaster_handle = ws::start_broadcaster(state.clone(), cancel.clone());
    let retention_handle = tokio::spawn(metrics_retention::run(
        pool,
        server_config.metrics_retention_hours,
        cancel.clone(),
    ));

    // --- Router ---
    let ws_manager = state.ws_manager.clone();
    let app = build_app_router(state, &server_config)?;

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                server_config.host, server_config.port
            )
        })?;
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(TASK_JOIN_TIMEOUT, broadcaster_handle).await;
    let _ = tokio::time::timeout(TASK_JOIN_TIMEOUT, retention_handle).await;
    let _ = tokio::time::timeout(TASK_JOIN_TIMEOUT, heartbeat_handle).await;
    tracing::info!("Background tasks stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Rules come from the YAML file. A missing file means the defaults:
/// autofix disabled, no rules.
fn load_rules(path: &Path) -> anyhow::Result<SysguardConfig> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Config file not found, autofix uses defaults");
        return Ok(SysguardConfig::default());
    }
    let config = config::load_from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        autofix_enabled = config.autofix.enabled,
        dry_run = config.autofix.dry_run,
        rules = config.autofix.rules.len(),
        "Rule configuration loaded",
    );
    Ok(config)
}

/// `DATABASE_URL` wins over `storage.path` from the config file.
async fn open_pool(server: &ServerConfig, sysguard: &SysguardConfig) -> anyhow::Result<DbPool> {
    let pool = match &server.database_url {
        Some(url) => sysguard_db::create_pool(url).await,
        None => sysguard_db::create_pool_at(&sysguard.storage.path).await,
    }
    .context("failed to open database")?;
    tracing::info!("Database connection pool created");

    sysguard_db::health_check(&pool)
        .await
        .context("database health check failed")?;

    sysguard_db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Resolve on SIGINT or, on Unix, SIGTERM. If a handler cannot be installed
/// the error is logged and that signal is ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
