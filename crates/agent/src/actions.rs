//! OS-level remediation actions.
//!
//! [`SystemActions`] is the production [`ActionExecutor`]. Every call blocks
//! until the underlying command or syscall returns; callers on an async
//! runtime run it inside `spawn_blocking`.

use std::io;
use std::path::PathBuf;
use std::process::Command;

use sysguard_core::autofix::action::is_safe_service_name;
use sysguard_core::autofix::{ActionError, ActionExecutor};

/// Kernel knob that drops clean page cache entries when `1` is written.
pub const DROP_CACHES_PATH: &str = "/proc/sys/vm/drop_caches";

/// Executes actions against the local host with `systemctl`, `sync` and
/// `kill(2)`.
#[derive(Debug, Clone)]
pub struct SystemActions {
    drop_caches_path: PathBuf,
    systemctl: String,
}

impl Default for SystemActions {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemActions {
    pub fn new() -> Self {
        Self {
            drop_caches_path: PathBuf::from(DROP_CACHES_PATH),
            systemctl: "systemctl".to_string(),
        }
    }

    /// Override the drop-caches file and service manager binary.
    pub fn with_paths(drop_caches_path: impl Into<PathBuf>, systemctl: impl Into<String>) -> Self {
        Self {
            drop_caches_path: drop_caches_path.into(),
            systemctl: systemctl.into(),
        }
    }
}

impl ActionExecutor for SystemActions {
    fn clear_cache(&self) -> Result<(), ActionError> {
        let status = Command::new("sync").status()?;
        if !status.success() {
            return Err(ActionError::CommandFailed(format!("sync exited with {status}")));
        }

        std::fs::write(&self.drop_caches_path, "1").map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => ActionError::PermissionDenied(format!(
                "writing {} requires root",
                self.drop_caches_path.display()
            )),
            _ => ActionError::Io(e),
        })?;

        tracing::info!(path = %self.drop_caches_path.display(), "Page cache dropped");
        Ok(())
    }

    fn restart_service(&self, service: &str) -> Result<(), ActionError> {
        if !is_safe_service_name(service) {
            return Err(ActionError::InvalidServiceName(service.to_string()));
        }

        tracing::info!(service, "Executing service restart");

        let output = Command::new(&self.systemctl)
            .args(["restart", service])
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ActionError::ServiceManagerUnavailable(format!(
                    "{} not found",
                    self.systemctl
                )),
                _ => ActionError::Io(e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ActionError::CommandFailed(format!(
                "{} restart {service} failed (exit {}): {}",
                self.systemctl,
                output.status.code().unwrap_or(-1),
                stderr.trim(),
            )))
        }
    }

    fn kill_process(&self, pid: u32) -> Result<(), ActionError> {
        // 0 and negative values address process groups.
        let raw = i32::try_from(pid)
            .ok()
            .filter(|&p| p > 0)
            .ok_or(ActionError::ProcessNotFound(pid))?;

        // SAFETY: kill(2) has no memory-safety preconditions.
        let ret = unsafe { libc::kill(raw, libc::SIGKILL) };
        if ret == 0 {
            tracing::info!(pid, "Sent SIGKILL");
            return Ok(());
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Err(ActionError::ProcessNotFound(pid)),
            Some(libc::EPERM) => Err(ActionError::PermissionDenied(format!(
                "not allowed to signal pid {pid}"
            ))),
            _ => Err(ActionError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sysguard_core::autofix::dispatch;

    use super::*;

    #[test]
    fn restart_rejects_unsafe_names_before_spawning() {
        // A nonexistent binary proves the name check runs first.
        let actions = SystemActions::with_paths("/nonexistent", "/nonexistent/systemctl");
        assert_matches!(
            actions.restart_service("nginx; reboot"),
            Err(ActionError::InvalidServiceName(_))
        );
    }

    #[test]
    fn restart_without_service_manager_fails() {
        let actions = SystemActions::with_paths("/nonexistent", "/nonexistent/systemctl");
        assert_matches!(
            actions.restart_service("nginx"),
            Err(ActionError::ServiceManagerUnavailable(_))
        );
        assert!(!dispatch(&actions, "restart_nginx"));
    }

    #[test]
    fn clear_cache_writes_marker() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("drop_caches");
        let actions = SystemActions::with_paths(&target, "systemctl");

        actions.clear_cache().unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "1");
    }

    #[test]
    fn clear_cache_into_missing_directory_fails() {
        let actions = SystemActions::with_paths("/nonexistent/dir/drop_caches", "systemctl");
        assert!(actions.clear_cache().is_err());
    }

    #[test]
    fn kill_pid_zero_is_rejected() {
        let actions = SystemActions::new();
        assert_matches!(actions.kill_process(0), Err(ActionError::ProcessNotFound(0)));
    }

    #[test]
    fn kill_unlikely_pid_reports_not_found_or_denied() {
        let actions = SystemActions::new();
        assert_matches!(
            actions.kill_process(4_194_300),
            Err(ActionError::ProcessNotFound(_) | ActionError::PermissionDenied(_))
        );
    }
}
