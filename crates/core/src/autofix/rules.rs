//! Declarative autofix rules and their configuration block.

use serde::{Deserialize, Serialize};

use super::action::{is_safe_service_name, Action};
use super::condition;

/// A single rule: when `trigger` holds, perform `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Used only for reporting.
    pub name: String,
    /// Condition string, see [`condition`].
    pub trigger: String,
    /// Action identifier, see [`Action::parse`].
    pub action: String,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        trigger: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: trigger.into(),
            action: action.into(),
        }
    }
}

/// The `autofix:` section of the configuration file.
///
/// A missing section means the engine is disabled. `dry_run` defaults to
/// `true` so enabling the engine without thinking about it never touches the
/// system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutofixConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_dry_run() -> bool {
    true
}

impl Default for AutofixConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dry_run: default_dry_run(),
            rules: Vec::new(),
        }
    }
}

/// A problem found while linting a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIssue {
    /// Zero-based position in the rule list.
    pub index: usize,
    pub rule_name: String,
    pub problem: String,
}

/// Lint every rule without evaluating it.
///
/// The engine tolerates all of these at runtime (the rule simply never
/// fires, or its action is ignored); this exists so operators can find them
/// before they matter.
pub fn lint_rules(rules: &[Rule]) -> Vec<RuleIssue> {
    let mut issues = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let mut push = |problem: String| {
            issues.push(RuleIssue {
                index,
                rule_name: rule.name.clone(),
                problem,
            });
        };

        if rule.name.trim().is_empty() {
            push("rule name is empty".to_string());
        }

        if let Err(e) = condition::parse(&rule.trigger) {
            push(e.to_string());
        }

        match Action::parse(&rule.action) {
            Action::ClearCache => {}
            Action::RestartService(service) if !is_safe_service_name(&service) => {
                push(format!("invalid service name in action {:?}", rule.action));
            }
            Action::RestartService(_) => {}
            Action::Unrecognized(id) => push(format!("unrecognized action {id:?}")),
        }
    }

    issues
}
