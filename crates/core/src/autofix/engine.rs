//! The autofix check cycle.
//!
//! One cycle: fetch a snapshot, flatten it once, evaluate every rule in
//! declaration order, and (outside dry-run mode) dispatch each triggered
//! rule's action synchronously. Pure apart from the executor calls; the only
//! error a cycle can return is the metrics source failing.

use std::fmt;

use serde::Serialize;

use super::action::{dispatch, ActionExecutor};
use super::condition;
use super::rules::AutofixConfig;
use crate::metrics::{flatten, FlatMetrics, MetricsError, MetricsSnapshot, MetricsSource};

/// What happened to a triggered rule's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Dry-run mode: recorded, not dispatched.
    Skipped,
    Succeeded,
    Failed,
}

/// A rule whose trigger held during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggeredAction {
    pub rule_name: String,
    pub action: String,
    pub outcome: ActionOutcome,
}

impl TriggeredAction {
    /// Human-readable line, e.g. `Rule 'HighCPU' triggered: clear_cache`.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TriggeredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule '{}' triggered: {}", self.rule_name, self.action)
    }
}

/// Rule evaluation and remediation engine.
///
/// Holds only its immutable configuration and the executor; callers decide
/// when to run a cycle and must not run two at once if actions are live.
pub struct AutoFixEngine<E> {
    config: AutofixConfig,
    executor: E,
}

impl<E: ActionExecutor> AutoFixEngine<E> {
    pub fn new(config: AutofixConfig, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &AutofixConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run one cycle and return the description of every triggered rule.
    ///
    /// A disabled engine returns an empty list without querying `source`.
    pub fn run_check(&self, source: &dyn MetricsSource) -> Result<Vec<String>, MetricsError> {
        Ok(self
            .run_cycle(source)?
            .iter()
            .map(TriggeredAction::description)
            .collect())
    }

    /// Like [`run_check`](Self::run_check) but keeps per-rule outcomes.
    pub fn run_cycle(
        &self,
        source: &dyn MetricsSource,
    ) -> Result<Vec<TriggeredAction>, MetricsError> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }
        let snapshot = source.fetch()?;
        Ok(self.check_snapshot(&snapshot))
    }

    /// Run one cycle against an already captured snapshot.
    ///
    /// Lets a caller that needs the snapshot anyway (for display or logging)
    /// avoid a second fetch. Returns nothing when the engine is disabled.
    pub fn check_snapshot(&self, snapshot: &MetricsSnapshot) -> Vec<TriggeredAction> {
        if !self.config.enabled {
            return Vec::new();
        }

        let flat = flatten(snapshot);
        let mut triggered = Vec::new();

        for (rule_name, action) in self.matching_rules(&flat) {
            let outcome = if self.config.dry_run {
                tracing::info!(rule = rule_name, action, "[dry run] Would execute action");
                ActionOutcome::Skipped
            } else {
                tracing::info!(rule = rule_name, action, "Executing action");
                if dispatch(&self.executor, action) {
                    ActionOutcome::Succeeded
                } else {
                    ActionOutcome::Failed
                }
            };

            triggered.push(TriggeredAction {
                rule_name: rule_name.to_string(),
                action: action.to_string(),
                outcome,
            });
        }

        triggered
    }

    /// `(rule name, action)` for every rule whose trigger holds, in
    /// declaration order. Never dispatches.
    pub fn matching_rules<'a>(
        &'a self,
        flat: &'a FlatMetrics,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.config
            .rules
            .iter()
            .filter(move |rule| condition::evaluate(flat, &rule.trigger))
            .map(|rule| (rule.name.as_str(), rule.action.as_str()))
    }
}
