use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sysguard_core::config::DEFAULT_CONFIG_PATH;

/// Ten years.
pub const MAX_RETENTION_HOURS: i64 = 24 * 365 * 10;

/// Server configuration loaded from environment variables.
///
/// Rule configuration lives in the YAML file named by `config_path`; this
/// struct only covers how the server itself runs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Milliseconds between WebSocket metric pushes (default: `1000`).
    pub stream_interval_ms: u64,
    /// Upper bound on a blocking metrics fetch or autofix cycle (default: `20`).
    pub action_timeout_secs: u64,
    /// Metric samples older than this are purged (default: `24`).
    pub metrics_retention_hours: i64,
    /// Overrides `storage.path` from the config file when set.
    pub database_url: Option<String>,
    /// YAML configuration file (default: `config/sysguard.yaml`).
    pub config_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            stream_interval_ms: 1000,
            action_timeout_secs: 20,
            metrics_retention_hours: 24,
            database_url: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `STREAM_INTERVAL_MS`      | `1000`                  |
    /// | `ACTION_TIMEOUT_SECS`     | `20`                    |
    /// | `METRICS_RETENTION_HOURS` | `24`                    |
    /// | `DATABASE_URL`            | unset                   |
    /// | `SYSGUARD_CONFIG`         | `config/sysguard.yaml`  |
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        let config = Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            stream_interval_ms: env_or("STREAM_INTERVAL_MS", defaults.stream_interval_ms)?,
            action_timeout_secs: env_or("ACTION_TIMEOUT_SECS", defaults.action_timeout_secs)?,
            metrics_retention_hours: env_or(
                "METRICS_RETENTION_HOURS",
                defaults.metrics_retention_hours,
            )?,
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            config_path: std::env::var("SYSGUARD_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks run by [`from_env`](Self::from_env).
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.stream_interval_ms == 0 {
            anyhow::bail!("STREAM_INTERVAL_MS must be > 0");
        }
        if self.action_timeout_secs == 0 {
            anyhow::bail!("ACTION_TIMEOUT_SECS must be > 0");
        }
        if !(1..=MAX_RETENTION_HOURS).contains(&self.metrics_retention_hours) {
            anyhow::bail!(
                "METRICS_RETENTION_HOURS must be between 1 and {MAX_RETENTION_HOURS}, got {}",
                self.metrics_retention_hours
            );
        }
        Ok(())
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }
}

/// Parse `name` from the environment, or return `default` when unset.
fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}
