//! The `monitor` command: one autofix cycle, or a cycle every
//! `monitoring.interval` seconds until Ctrl-C.
//!
//! Each cycle runs on the blocking pool (metrics collection and actions both
//! block), then persists triggered rules as alerts. In watch mode it also
//! records a metric sample per cycle. Storage failures are logged and never
//! stop the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sysguard_core::autofix::{ActionExecutor, AutoFixEngine, TriggeredAction};
use sysguard_core::metric_names::{FLAT_CPU_USAGE_PERCENT, FLAT_DISK_PERCENT, FLAT_MEMORY_PERCENT};
use sysguard_core::metrics::{flatten, MetricsError, MetricsSnapshot, MetricsSource, ProcessInfo};
use sysguard_core::types::Timestamp;
use sysguard_db::models::metric_sample::CreateMetricSample;
use sysguard_db::repositories::{AlertRepo, MetricSampleRepo};
use sysguard_db::DbPool;

use crate::cli::OutputMode;
use crate::collector::HostMetrics;
use crate::render;

/// Clear screen and home the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Everything one cycle observed and did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub timestamp: Timestamp,
    pub metrics: MetricsSnapshot,
    pub processes: Vec<ProcessInfo>,
    pub triggered: Vec<TriggeredAction>,
}

pub struct Monitor<E> {
    engine: Arc<AutoFixEngine<E>>,
    source: Arc<dyn MetricsSource>,
    pool: DbPool,
    top_processes: usize,
}

impl<E: ActionExecutor + 'static> Monitor<E> {
    pub fn new(
        engine: AutoFixEngine<E>,
        source: Arc<dyn MetricsSource>,
        pool: DbPool,
        top_processes: usize,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            source,
            pool,
            top_processes,
        }
    }

    /// Fetch once, evaluate rules against that snapshot, persist alerts.
    ///
    /// Only a snapshot failure is returned as an error. Once rules have been
    /// evaluated their actions have run, so a failed process listing only
    /// empties the process table.
    pub async fn run_cycle(&self, record_sample: bool) -> anyhow::Result<CycleReport> {
        let engine = Arc::clone(&self.engine);
        let source = Arc::clone(&self.source);
        let top = self.top_processes;

        let (metrics, processes, triggered) =
            tokio::task::spawn_blocking(move || -> Result<_, MetricsError> {
                let snapshot = source.fetch()?;
                let triggered = engine.check_snapshot(&snapshot);
                let processes = source.top_processes(top).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Process listing failed");
                    Vec::new()
                });
                Ok((snapshot, processes, triggered))
            })
            .await??;

        if record_sample {
            self.record_sample(&metrics).await;
        }
        AlertRepo::record_triggered(&self.pool, &triggered).await;

        Ok(CycleReport {
            timestamp: Utc::now(),
            metrics,
            processes,
            triggered,
        })
    }

    /// Run cycles until Ctrl-C. A failed cycle is logged and retried on the
    /// next tick.
    pub async fn watch(&self, interval: Duration, mode: OutputMode) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(interval_ms = interval.as_millis() as u64, "Watch mode started");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Watch mode stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.run_cycle(true).await {
                        Ok(report) => self.print(&report, mode, true)?,
                        Err(e) => tracing::error!(error = %e, "Monitor cycle failed"),
                    }
                }
            }
        }
    }

    pub fn print(&self, report: &CycleReport, mode: OutputMode, redraw: bool) -> anyhow::Result<()> {
        match mode {
            OutputMode::Json => println!("{}", serde_json::to_string(report)?),
            OutputMode::Human => {
                if redraw {
                    print!("{CLEAR_SCREEN}");
                }
                println!("{}", self.render(report));
            }
        }
        Ok(())
    }

    /// Status table, process table and autofix panel.
    pub fn render(&self, report: &CycleReport) -> String {
        let config = self.engine.config();
        let status = HostMetrics::from_snapshot(&report.metrics)
            .map(|m| render::format_status(&m))
            .unwrap_or_else(|| "Metrics incomplete.".to_string());
        [
            status,
            render::format_process_table(&report.processes),
            render::format_autofix_panel(config.enabled, config.dry_run, &report.triggered),
        ]
        .join("\n\n")
    }

    async fn record_sample(&self, snapshot: &MetricsSnapshot) {
        let flat = flatten(snapshot);
        let sample = match (
            flat.get(FLAT_CPU_USAGE_PERCENT),
            flat.get(FLAT_MEMORY_PERCENT),
            flat.get(FLAT_DISK_PERCENT),
        ) {
            (Some(&cpu), Some(&memory), Some(&disk)) => CreateMetricSample {
                cpu_percent: cpu,
                memory_percent: memory,
                disk_percent: disk,
            },
            _ => {
                tracing::debug!("Snapshot lacks headline percentages, sample not recorded");
                return;
            }
        };

        if let Err(e) = MetricSampleRepo::insert(&self.pool, &sample).await {
            tracing::error!(error = %e, "Failed to record metric sample");
        }
    }
}
