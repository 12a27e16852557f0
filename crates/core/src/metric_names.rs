//! Well-known metric category/name constants and WebSocket message types.
//!
//! These are the canonical names used by the collector when it builds a
//! [`MetricsSnapshot`](crate::metrics::MetricsSnapshot), by rule triggers in
//! the configuration file (after flattening), and by the streaming protocol.

/// Snapshot category holding CPU metrics.
pub const CATEGORY_CPU: &str = "cpu";

/// Snapshot category holding memory metrics.
pub const CATEGORY_MEMORY: &str = "memory";

/// Snapshot category holding root-filesystem / aggregate disk metrics.
pub const CATEGORY_DISK: &str = "disk";

/// Global CPU utilisation percentage (0-100).
pub const CPU_USAGE_PERCENT: &str = "usage_percent";
pub const CPU_CORES_LOGICAL: &str = "cores_logical";
pub const CPU_LOAD_AVG_1: &str = "load_avg_1";
pub const CPU_LOAD_AVG_5: &str = "load_avg_5";
pub const CPU_LOAD_AVG_15: &str = "load_avg_15";

pub const MEMORY_TOTAL_MB: &str = "total_mb";
pub const MEMORY_USED_MB: &str = "used_mb";
pub const MEMORY_AVAILABLE_MB: &str = "available_mb";

pub const DISK_TOTAL_GB: &str = "total_gb";
pub const DISK_USED_GB: &str = "used_gb";
pub const DISK_FREE_GB: &str = "free_gb";

/// Used-space percentage, shared by the memory and disk categories.
pub const PERCENT: &str = "percent";

/// Flat key for CPU usage after flattening (`cpu` + `usage_percent`).
pub const FLAT_CPU_USAGE_PERCENT: &str = "cpu_usage_percent";

/// Flat key for memory usage after flattening.
pub const FLAT_MEMORY_PERCENT: &str = "memory_percent";

/// Flat key for disk usage after flattening.
pub const FLAT_DISK_PERCENT: &str = "disk_percent";

/// Short alias for CPU usage kept as a bare top-level snapshot value so that
/// rule files written against `cpu_percent` keep working.
pub const ALIAS_CPU_PERCENT: &str = "cpu_percent";

/// WebSocket message type discriminator for streamed metric payloads.
pub const MSG_TYPE_METRICS: &str = "metrics";
