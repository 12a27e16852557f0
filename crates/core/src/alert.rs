//! Alert categories written to the alert log.

use serde::{Deserialize, Serialize};

use crate::autofix::{ActionOutcome, TriggeredAction};

/// The `type` column of an alert row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A rule triggered (dispatched, skipped by dry-run, or succeeded).
    Autofix,
    /// A rule triggered and its action failed.
    ActionFailed,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autofix => "autofix",
            Self::ActionFailed => "action_failed",
        }
    }

    /// Classify a triggered rule for logging.
    pub fn for_triggered(triggered: &TriggeredAction) -> Self {
        match triggered.outcome {
            ActionOutcome::Failed => Self::ActionFailed,
            ActionOutcome::Skipped | ActionOutcome::Succeeded => Self::Autofix,
        }
    }
}
