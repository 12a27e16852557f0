//! Action identifiers and the dispatch table.
//!
//! Rules name their remediation with a string identifier. [`Action::parse`]
//! resolves it (exact match or prefix) and [`dispatch`] hands it to an
//! [`ActionExecutor`], which owns the actual OS calls. Failures are reported
//! as `false`, never propagated.

use std::sync::Arc;

/// Identifier that flushes the OS page cache.
pub const ACTION_CLEAR_CACHE: &str = "clear_cache";

/// Prefix of identifiers that restart a service; the remainder is the unit.
pub const ACTION_RESTART_PREFIX: &str = "restart_";

/// Maximum accepted service name length.
const MAX_SERVICE_NAME_LEN: usize = 128;

/// `[A-Za-z0-9._-]{1,128}`. Anything else never reaches the service manager.
pub fn is_safe_service_name(name: &str) -> bool {
    (1..=MAX_SERVICE_NAME_LEN).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// A resolved action identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ClearCache,
    RestartService(String),
    /// Anything else. Ignored at dispatch time.
    Unrecognized(String),
}

impl Action {
    pub fn parse(identifier: &str) -> Self {
        if identifier == ACTION_CLEAR_CACHE {
            Self::ClearCache
        } else if let Some(service) = identifier.strip_prefix(ACTION_RESTART_PREFIX) {
            Self::RestartService(service.to_string())
        } else {
            Self::Unrecognized(identifier.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid service name: {0:?}")]
    InvalidServiceName(String),

    #[error("service manager unavailable: {0}")]
    ServiceManagerUnavailable(String),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("process {0} not found")]
    ProcessNotFound(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Performs remediations. All calls block until the OS operation finishes.
pub trait ActionExecutor: Send + Sync {
    /// Flush the page cache (needs root).
    fn clear_cache(&self) -> Result<(), ActionError>;

    /// Restart a service through the service manager.
    fn restart_service(&self, service: &str) -> Result<(), ActionError>;

    /// Send SIGKILL to `pid`.
    ///
    /// Not reachable from rule identifiers; only the CLI calls this.
    fn kill_process(&self, pid: u32) -> Result<(), ActionError>;
}

impl<T: ActionExecutor + ?Sized> ActionExecutor for Arc<T> {
    fn clear_cache(&self) -> Result<(), ActionError> {
        (**self).clear_cache()
    }

    fn restart_service(&self, service: &str) -> Result<(), ActionError> {
        (**self).restart_service(service)
    }

    fn kill_process(&self, pid: u32) -> Result<(), ActionError> {
        (**self).kill_process(pid)
    }
}

/// Resolve `identifier` and run it. Returns whether the action succeeded.
///
/// Unrecognized identifiers are logged and return `false` without touching
/// the executor.
pub fn dispatch<E: ActionExecutor + ?Sized>(executor: &E, identifier: &str) -> bool {
    let result = match Action::parse(identifier) {
        Action::ClearCache => executor.clear_cache(),
        Action::RestartService(service) => executor.restart_service(&service),
        Action::Unrecognized(_) => {
            tracing::warn!(action = identifier, "Unrecognized action identifier, ignoring");
            return false;
        }
    };

    match result {
        Ok(()) => {
            tracing::info!(action = identifier, "Action succeeded");
            true
        }
        Err(e) => {
            tracing::error!(action = identifier, error = %e, "Action failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Recorder {
        fn record(&self, call: String) -> Result<(), ActionError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(ActionError::PermissionDenied("test".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl ActionExecutor for Recorder {
        fn clear_cache(&self) -> Result<(), ActionError> {
            self.record("clear_cache".to_string())
        }

        fn restart_service(&self, service: &str) -> Result<(), ActionError> {
            self.record(format!("restart:{service}"))
        }

        fn kill_process(&self, pid: u32) -> Result<(), ActionError> {
            self.record(format!("kill:{pid}"))
        }
    }

    #[test]
    fn parse_exact_and_prefix() {
        assert_eq!(Action::parse("clear_cache"), Action::ClearCache);
        assert_eq!(
            Action::parse("restart_nginx"),
            Action::RestartService("nginx".to_string())
        );
        assert_eq!(
            Action::parse("restart_my_app.service"),
            Action::RestartService("my_app.service".to_string())
        );
        assert_eq!(
            Action::parse("clear_cache_now"),
            Action::Unrecognized("clear_cache_now".to_string())
        );
        assert_eq!(
            Action::parse("kill_1234"),
            Action::Unrecognized("kill_1234".to_string())
        );
    }

    #[test]
    fn dispatch_routes_to_executor() {
        let recorder = Recorder::default();
        assert!(dispatch(&recorder, "clear_cache"));
        assert!(dispatch(&recorder, "restart_postgresql"));
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec!["clear_cache".to_string(), "restart:postgresql".to_string()]
        );
    }

    #[test]
    fn dispatch_ignores_unknown_identifiers() {
        let recorder = Recorder::default();
        assert!(!dispatch(&recorder, "reboot"));
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn dispatch_reports_failure_as_false() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        assert!(!dispatch(&recorder, "clear_cache"));
        assert_eq!(recorder.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn service_names_accepted_by_restart() {
        for name in ["sshd", "php8.2-fpm", "cron.service", "my_worker"] {
            assert!(is_safe_service_name(name), "{name}");
        }
        assert!(is_safe_service_name(&"x".repeat(128)));
    }

    #[test]
    fn service_names_with_shell_syntax_are_refused() {
        for name in ["", "postgresql@16-main", "a|b", "svc&&reboot", "`id`", "../etc", "tab\tname", "ünicode"] {
            assert!(!is_safe_service_name(name), "{name:?}");
        }
        assert!(!is_safe_service_name(&"x".repeat(129)));
    }
}
