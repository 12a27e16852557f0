//! Configuration file schema and loader.
//!
//! The file is YAML and every section is optional:
//!
//! ```yaml
//! monitoring:
//!   interval: 1
//!   top_processes: 5
//! storage:
//!   path: sysguard.db
//! autofix:
//!   enabled: true
//!   dry_run: false
//!   rules:
//!     - name: HighCPU
//!       trigger: "cpu_usage_percent > 80"
//!       action: clear_cache
//! ```
//!
//! The configuration is loaded once at startup and passed by value into the
//! components that need it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::autofix::AutofixConfig;

/// Default path when neither `--config` nor `SYSGUARD_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/sysguard.yaml";

/// Default SQLite file.
pub const DEFAULT_DB_PATH: &str = "sysguard.db";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SysguardConfig {
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub autofix: AutofixConfig,
}

/// Polling cadence for watch mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Seconds between cycles. Fractions are allowed.
    #[serde(default = "default_interval")]
    pub interval: f64,
    /// Rows in the watch-mode process table.
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
}

fn default_interval() -> f64 {
    1.0
}

fn default_top_processes() -> usize {
    5
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            top_processes: default_top_processes(),
        }
    }
}

impl MonitoringConfig {
    /// The interval as a [`Duration`]. Only valid after [`validate`] passed.
    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs_f64(self.interval)
    }
}

/// Where the alert and metric log lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Read and validate a configuration file.
pub fn load_from_file(path: &Path) -> Result<SysguardConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

/// Parse and validate a YAML document.
pub fn load_from_str(yaml: &str) -> Result<SysguardConfig, ConfigError> {
    let config: SysguardConfig = serde_yaml::from_str(yaml)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &SysguardConfig) -> Result<(), ConfigError> {
    let interval = config.monitoring.interval;
    if !interval.is_finite() || interval <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "monitoring.interval must be a positive number of seconds, got {interval}"
        )));
    }
    if config.monitoring.top_processes == 0 {
        return Err(ConfigError::Validation(
            "monitoring.top_processes must be > 0".into(),
        ));
    }
    if config.storage.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage.path must not be empty".into(),
        ));
    }
    if let Some(index) = config
        .autofix
        .rules
        .iter()
        .position(|r| r.name.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "autofix.rules[{index}].name must not be empty"
        )));
    }
    Ok(())
}
