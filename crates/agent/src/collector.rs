//! `sysinfo`-based host metrics collection.
//!
//! [`SystemCollector`] keeps one [`sysinfo::System`] behind a mutex so a
//! single collector can be shared between the CLI loop, HTTP handlers and
//! the WebSocket broadcaster. CPU usage is a delta between two refreshes, so
//! the very first reading after construction is only meaningful once
//! [`SystemCollector::warm_up`] has run.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System, Users};
use sysguard_core::metric_names::{
    ALIAS_CPU_PERCENT, CATEGORY_CPU, CATEGORY_DISK, CATEGORY_MEMORY, CPU_CORES_LOGICAL,
    CPU_LOAD_AVG_1, CPU_LOAD_AVG_15, CPU_LOAD_AVG_5, CPU_USAGE_PERCENT, DISK_FREE_GB,
    DISK_TOTAL_GB, DISK_USED_GB, MEMORY_AVAILABLE_MB, MEMORY_TOTAL_MB, MEMORY_USED_MB, PERCENT,
};
use sysguard_core::metrics::{MetricsError, MetricsSnapshot, MetricsSource, ProcessInfo};

const BYTES_PER_MB: u64 = 1024 * 1024;
const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Filesystem types left out of the disk totals.
pub const PSEUDO_FILESYSTEMS: &[&str] = &[
    "tmpfs",
    "devtmpfs",
    "sysfs",
    "proc",
    "cgroup2",
    "overlay",
    "squashfs",
    "efivarfs",
    "bpf",
    "hugetlbfs",
    "mqueue",
    "pstore",
    "securityfs",
    "debugfs",
    "tracefs",
    "fusectl",
    "rpc_pipefs",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub usage_percent: f32,
    pub cores_logical: usize,
    pub load_avg_1: f64,
    pub load_avg_5: f64,
    pub load_avg_15: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub total_mb: u64,
    pub used_mb: u64,
    pub available_mb: u64,
    pub percent: f64,
}

/// Totals across every real mounted filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    pub total_gb: u64,
    pub used_gb: u64,
    pub free_gb: u64,
    pub percent: f64,
}

/// Typed collector output, converted into a [`MetricsSnapshot`] for rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMetrics {
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub disk: DiskMetrics,
}

impl HostMetrics {
    /// Build the nested snapshot the engine evaluates.
    ///
    /// Besides the three categories, CPU usage is also exposed as the bare
    /// `cpu_percent` value.
    pub fn to_snapshot(&self) -> MetricsSnapshot {
        let cpu_usage = f64::from(self.cpu.usage_percent);
        MetricsSnapshot::new()
            .with_group(
                CATEGORY_CPU,
                [
                    (CPU_USAGE_PERCENT, cpu_usage),
                    (CPU_CORES_LOGICAL, self.cpu.cores_logical as f64),
                    (CPU_LOAD_AVG_1, self.cpu.load_avg_1),
                    (CPU_LOAD_AVG_5, self.cpu.load_avg_5),
                    (CPU_LOAD_AVG_15, self.cpu.load_avg_15),
                ],
            )
            .with_group(
                CATEGORY_MEMORY,
                [
                    (MEMORY_TOTAL_MB, self.memory.total_mb as f64),
                    (MEMORY_USED_MB, self.memory.used_mb as f64),
                    (MEMORY_AVAILABLE_MB, self.memory.available_mb as f64),
                    (PERCENT, self.memory.percent),
                ],
            )
            .with_group(
                CATEGORY_DISK,
                [
                    (DISK_TOTAL_GB, self.disk.total_gb as f64),
                    (DISK_USED_GB, self.disk.used_gb as f64),
                    (DISK_FREE_GB, self.disk.free_gb as f64),
                    (PERCENT, self.disk.percent),
                ],
            )
            .with_value(ALIAS_CPU_PERCENT, cpu_usage)
    }

    /// Inverse of [`to_snapshot`](Self::to_snapshot). `None` if any of the
    /// three headline percentages is missing; other fields default to zero.
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Option<Self> {
        let get = |cat: &str, metric: &str| snapshot.get(cat, metric).unwrap_or_default();
        Some(Self {
            cpu: CpuMetrics {
                usage_percent: snapshot.get(CATEGORY_CPU, CPU_USAGE_PERCENT)? as f32,
                cores_logical: get(CATEGORY_CPU, CPU_CORES_LOGICAL) as usize,
                load_avg_1: get(CATEGORY_CPU, CPU_LOAD_AVG_1),
                load_avg_5: get(CATEGORY_CPU, CPU_LOAD_AVG_5),
                load_avg_15: get(CATEGORY_CPU, CPU_LOAD_AVG_15),
            },
            memory: MemoryMetrics {
                total_mb: get(CATEGORY_MEMORY, MEMORY_TOTAL_MB) as u64,
                used_mb: get(CATEGORY_MEMORY, MEMORY_USED_MB) as u64,
                available_mb: get(CATEGORY_MEMORY, MEMORY_AVAILABLE_MB) as u64,
                percent: snapshot.get(CATEGORY_MEMORY, PERCENT)?,
            },
            disk: DiskMetrics {
                total_gb: get(CATEGORY_DISK, DISK_TOTAL_GB) as u64,
                used_gb: get(CATEGORY_DISK, DISK_USED_GB) as u64,
                free_gb: get(CATEGORY_DISK, DISK_FREE_GB) as u64,
                percent: snapshot.get(CATEGORY_DISK, PERCENT)?,
            },
        })
    }
}

/// Returns `(numerator / denominator) * 100.0`, or `0.0` when `denominator` is zero.
pub fn safe_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        (numerator as f64 / denominator as f64) * 100.0
    } else {
        0.0
    }
}

/// Sort by CPU descending and keep the first `limit` rows.
pub fn top_by_cpu(mut processes: Vec<ProcessInfo>, limit: usize) -> Vec<ProcessInfo> {
    processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    processes.truncate(limit);
    processes
}

/// Production [`MetricsSource`] backed by `sysinfo`.
pub struct SystemCollector {
    sys: Mutex<System>,
    users: Users,
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCollector {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: Mutex::new(sys),
            users: Users::new_with_refreshed_list(),
        }
    }

    /// Block for the minimum CPU sampling interval and refresh once, so the
    /// next reading reports real utilisation instead of zero.
    pub fn warm_up(&self) -> Result<(), MetricsError> {
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        let mut sys = self.lock()?;
        sys.refresh_cpu_usage();
        Ok(())
    }

    /// Refresh CPU, memory and disks and return typed metrics.
    pub fn collect(&self) -> Result<HostMetrics, MetricsError> {
        let mut sys = self.lock()?;
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let cpu = collect_cpu(&sys);
        let memory = collect_memory(&sys);
        drop(sys);

        Ok(HostMetrics {
            cpu,
            memory,
            disk: collect_disk(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, System>, MetricsError> {
        self.sys
            .lock()
            .map_err(|e| MetricsError::Unavailable(format!("system lock poisoned: {e}")))
    }
}

impl MetricsSource for SystemCollector {
    fn fetch(&self) -> Result<MetricsSnapshot, MetricsError> {
        Ok(self.collect()?.to_snapshot())
    }

    fn top_processes(&self, limit: usize) -> Result<Vec<ProcessInfo>, MetricsError> {
        let mut sys = self.lock()?;
        sys.refresh_all();

        let total_memory = sys.total_memory();
        let processes = sys
            .processes()
            .values()
            .map(|process| {
                let user = process
                    .user_id()
                    .and_then(|uid| self.users.get_user_by_id(uid))
                    .map_or_else(|| "unknown".to_string(), |u| u.name().to_string());

                ProcessInfo {
                    pid: process.pid().as_u32(),
                    name: process.name().to_string_lossy().to_string(),
                    user,
                    cpu_percent: process.cpu_usage(),
                    memory_mb: process.memory() / BYTES_PER_MB,
                    memory_percent: safe_percent(process.memory(), total_memory),
                }
            })
            .collect();
        drop(sys);

        Ok(top_by_cpu(processes, limit))
    }
}

fn collect_cpu(sys: &System) -> CpuMetrics {
    let load_avg = System::load_average();
    CpuMetrics {
        usage_percent: sys.global_cpu_usage(),
        cores_logical: sys.cpus().len(),
        load_avg_1: load_avg.one,
        load_avg_5: load_avg.five,
        load_avg_15: load_avg.fifteen,
    }
}

fn collect_memory(sys: &System) -> MemoryMetrics {
    let total = sys.total_memory();
    let used = sys.used_memory();
    MemoryMetrics {
        total_mb: total / BYTES_PER_MB,
        used_mb: used / BYTES_PER_MB,
        available_mb: sys.available_memory() / BYTES_PER_MB,
        percent: safe_percent(used, total),
    }
}

fn collect_disk() -> DiskMetrics {
    let disks = Disks::new_with_refreshed_list();

    let (total, available) = disks
        .iter()
        .filter(|d| {
            let fs = d.file_system().to_string_lossy();
            !PSEUDO_FILESYSTEMS.iter().any(|&pseudo| fs == pseudo) && d.total_space() > 0
        })
        .fold((0u64, 0u64), |(total, available), d| {
            (total + d.total_space(), available + d.available_space())
        });
    let used = total.saturating_sub(available);

    DiskMetrics {
        total_gb: total / BYTES_PER_GB,
        used_gb: used / BYTES_PER_GB,
        free_gb: available / BYTES_PER_GB,
        percent: safe_percent(used, total),
    }
}
