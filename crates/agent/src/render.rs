//! Plain-text tables for the CLI. Every function returns a `String` so the
//! layout can be tested without a terminal.

use sysguard_core::autofix::{ActionOutcome, TriggeredAction};
use sysguard_core::metrics::ProcessInfo;
use sysguard_db::models::alert::Alert;

use crate::collector::HostMetrics;

const BAR_WIDTH: usize = 20;

/// `[#######.............]` for a 0-100 value.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn section(title: &str) -> String {
    format!("{title}\n{}", "-".repeat(title.chars().count()))
}

pub fn format_status(metrics: &HostMetrics) -> String {
    let cpu = f64::from(metrics.cpu.usage_percent);
    let lines = [
        section("System Status"),
        format!(
            "{:<8} {} {:>6.1}%  {} cores, load {:.2} {:.2} {:.2}",
            "CPU",
            progress_bar(cpu, BAR_WIDTH),
            cpu,
            metrics.cpu.cores_logical,
            metrics.cpu.load_avg_1,
            metrics.cpu.load_avg_5,
            metrics.cpu.load_avg_15,
        ),
        format!(
            "{:<8} {} {:>6.1}%  {} / {} MB ({} MB available)",
            "Memory",
            progress_bar(metrics.memory.percent, BAR_WIDTH),
            metrics.memory.percent,
            metrics.memory.used_mb,
            metrics.memory.total_mb,
            metrics.memory.available_mb,
        ),
        format!(
            "{:<8} {} {:>6.1}%  {} / {} GB ({} GB free)",
            "Disk",
            progress_bar(metrics.disk.percent, BAR_WIDTH),
            metrics.disk.percent,
            metrics.disk.used_gb,
            metrics.disk.total_gb,
            metrics.disk.free_gb,
        ),
    ];
    lines.join("\n")
}

pub fn format_process_table(processes: &[ProcessInfo]) -> String {
    let header = format!(
        "{:<8} {:<24} {:<12} {:>7} {:>10} {:>7}",
        "PID", "NAME", "USER", "CPU%", "MEM(MB)", "MEM%"
    );
    let mut rows = vec![section("Top Processes"), header.clone(), "-".repeat(header.len())];

    for p in processes {
        let name: String = p.name.chars().take(23).collect();
        let user: String = p.user.chars().take(11).collect();
        rows.push(format!(
            "{:<8} {:<24} {:<12} {:>7.1} {:>10} {:>7.1}",
            p.pid, name, user, p.cpu_percent, p.memory_mb, p.memory_percent
        ));
    }

    rows.join("\n")
}

pub fn format_alert_table(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "No alerts recorded.".to_string();
    }

    let header = format!("{:<20} {:<14} {}", "TIME", "TYPE", "MESSAGE");
    let mut rows = vec![section("Recent Alerts"), header.clone(), "-".repeat(header.len())];
    for a in alerts {
        rows.push(format!(
            "{:<20} {:<14} {}",
            a.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            a.alert_type,
            a.message
        ));
    }
    rows.join("\n")
}

/// The autofix panel shown under the status table.
pub fn format_autofix_panel(enabled: bool, dry_run: bool, triggered: &[TriggeredAction]) -> String {
    let mode = match (enabled, dry_run) {
        (false, _) => "disabled",
        (true, true) => "dry run",
        (true, false) => "active",
    };
    let mut rows = vec![section(&format!("Autofix ({mode})"))];

    if triggered.is_empty() {
        rows.push("No rules triggered.".to_string());
    }
    for t in triggered {
        let outcome = match t.outcome {
            ActionOutcome::Skipped => "skipped",
            ActionOutcome::Succeeded => "ok",
            ActionOutcome::Failed => "FAILED",
        };
        rows.push(format!("{t} [{outcome}]"));
    }
    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::collector::{CpuMetrics, DiskMetrics, MemoryMetrics};

    fn host() -> HostMetrics {
        HostMetrics {
            cpu: CpuMetrics {
                usage_percent: 42.5,
                cores_logical: 8,
                load_avg_1: 1.0,
                load_avg_5: 0.5,
                load_avg_15: 0.25,
            },
            memory: MemoryMetrics {
                total_mb: 16000,
                used_mb: 8000,
                available_mb: 8000,
                percent: 50.0,
            },
            disk: DiskMetrics {
                total_gb: 500,
                used_gb: 450,
                free_gb: 50,
                percent: 90.0,
            },
        }
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(50.0, 4), "[##..]");
        assert_eq!(progress_bar(150.0, 4), "[####]");
        assert_eq!(progress_bar(-5.0, 4), "[....]");
    }

    #[test]
    fn status_lists_all_three_categories() {
        let out = format_status(&host());
        assert!(out.contains("CPU"));
        assert!(out.contains("42.5%"));
        assert!(out.contains("8000 / 16000 MB"));
        assert!(out.contains("450 / 500 GB"));
    }

    #[test]
    fn process_names_are_truncated() {
        let rows = vec![ProcessInfo {
            pid: 1,
            name: "a".repeat(40),
            user: "root".to_string(),
            cpu_percent: 12.0,
            memory_mb: 100,
            memory_percent: 1.0,
        }];
        let out = format_process_table(&rows);
        assert!(out.contains(&"a".repeat(23)));
        assert!(!out.contains(&"a".repeat(24)));
    }

    #[test]
    fn empty_alert_log() {
        assert_eq!(format_alert_table(&[]), "No alerts recorded.");
    }

    #[test]
    fn alert_rows_show_type_and_message() {
        let alerts = vec![Alert {
            id: 1,
            recorded_at: Utc::now(),
            alert_type: "autofix".to_string(),
            message: "Rule 'HighCPU' triggered: clear_cache".to_string(),
        }];
        let out = format_alert_table(&alerts);
        assert!(out.contains("autofix"));
        assert!(out.contains("Rule 'HighCPU' triggered: clear_cache"));
    }

    #[test]
    fn autofix_panel_reports_mode_and_outcomes() {
        let triggered = vec![TriggeredAction {
            rule_name: "HighCPU".to_string(),
            action: "clear_cache".to_string(),
            outcome: ActionOutcome::Skipped,
        }];
        let out = format_autofix_panel(true, true, &triggered);
        assert!(out.starts_with("Autofix (dry run)"));
        assert!(out.contains("Rule 'HighCPU' triggered: clear_cache [skipped]"));

        assert!(format_autofix_panel(false, true, &[]).contains("disabled"));
    }
}
