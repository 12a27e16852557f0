//! `sysguard` -- host metrics monitor with rule-driven auto-remediation.
//!
//! # Environment variables
//!
//! | Variable          | Required | Default                | Description                    |
//! |-------------------|----------|------------------------|--------------------------------|
//! | `SYSGUARD_CONFIG` | no       | `config/sysguard.yaml` | Configuration file path        |
//! | `RUST_LOG`        | no       | `sysguard_agent=info`  | Log filter (logs go to stderr) |

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sysguard_agent::actions::SystemActions;
use sysguard_agent::cli::{Cli, Command, OutputMode};
use sysguard_agent::collector::SystemCollector;
use sysguard_agent::monitor::Monitor;
use sysguard_agent::render;
use sysguard_core::autofix::{lint_rules, ActionExecutor, AutoFixEngine};
use sysguard_core::config::{self, SysguardConfig};
use sysguard_core::metrics::MetricsSource;
use sysguard_db::repositories::AlertRepo;
use sysguard_db::DbPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sysguard_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mode = cli.output_mode();

    match cli.command {
        Command::Status => {
            let collector = warmed_collector().await?;
            let metrics = tokio::task::spawn_blocking(move || collector.collect()).await??;
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
                OutputMode::Human => println!("{}", render::format_status(&metrics)),
            }
        }
        Command::Top { limit } => {
            let collector = warmed_collector().await?;
            let processes =
                tokio::task::spawn_blocking(move || collector.top_processes(limit)).await??;
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string_pretty(&processes)?),
                OutputMode::Human => println!("{}", render::format_process_table(&processes)),
            }
        }
        Command::Monitor { watch } => {
            let config = load_config(&cli.config, false)?;
            let pool = open_store(&config).await?;
            let collector: Arc<dyn MetricsSource> = warmed_collector().await?;
            let engine = AutoFixEngine::new(config.autofix.clone(), SystemActions::new());
            let monitor = Monitor::new(engine, collector, pool, config.monitoring.top_processes);

            if watch {
                monitor
                    .watch(config.monitoring.interval_duration(), mode)
                    .await?;
            } else {
                let report = monitor.run_cycle(false).await?;
                monitor.print(&report, mode, false)?;
            }
        }
        Command::History { limit } => {
            let config = load_config(&cli.config, false)?;
            let pool = open_store(&config).await?;
            let alerts = AlertRepo::list_recent(&pool, limit.max(1)).await?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string_pretty(&alerts)?),
                OutputMode::Human => println!("{}", render::format_alert_table(&alerts)),
            }
        }
        Command::Kill { pid } => {
            let actions = SystemActions::new();
            actions
                .kill_process(pid)
                .with_context(|| format!("failed to kill process {pid}"))?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::json!({ "killed": pid })),
                OutputMode::Human => println!("Killed process {pid}"),
            }
        }
        Command::Check => {
            let config = load_config(&cli.config, true)?;
            let issues = lint_rules(&config.autofix.rules);
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string_pretty(&issues)?),
                OutputMode::Human if issues.is_empty() => {
                    println!("{} rule(s) OK", config.autofix.rules.len());
                }
                OutputMode::Human => {
                    for issue in &issues {
                        println!("rule #{} ({:?}): {}", issue.index, issue.rule_name, issue.problem);
                    }
                }
            }
            if !issues.is_empty() {
                anyhow::bail!("{} problem(s) found in {}", issues.len(), cli.config.display());
            }
        }
    }

    Ok(())
}

/// Load the configuration file. A missing file falls back to defaults
/// unless `required` is set.
fn load_config(path: &Path, required: bool) -> anyhow::Result<SysguardConfig> {
    if !required && !path.exists() {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(SysguardConfig::default());
    }
    let config = config::load_from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        autofix_enabled = config.autofix.enabled,
        dry_run = config.autofix.dry_run,
        rules = config.autofix.rules.len(),
        "Configuration loaded",
    );
    Ok(config)
}

async fn open_store(config: &SysguardConfig) -> anyhow::Result<DbPool> {
    let pool = sysguard_db::create_pool_at(&config.storage.path)
        .await
        .with_context(|| format!("failed to open {}", config.storage.path.display()))?;
    sysguard_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    Ok(pool)
}

async fn warmed_collector() -> anyhow::Result<Arc<SystemCollector>> {
    let collector = tokio::task::spawn_blocking(|| {
        let collector = SystemCollector::new();
        collector.warm_up().map(|()| Arc::new(collector))
    })
    .await??;
    Ok(collector)
}
