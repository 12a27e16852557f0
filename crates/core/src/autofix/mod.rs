//! Rule evaluation and auto-remediation.
//!
//! All logic in this module is pure apart from the [`ActionExecutor`] calls
//! made by the engine. The executor implementation that touches the OS lives
//! in the agent crate so this module can be tested in isolation.

pub mod action;
pub mod condition;
pub mod engine;
pub mod rules;

pub use action::{dispatch, Action, ActionError, ActionExecutor};
pub use condition::{Comparison, Condition, ConditionError};
pub use engine::{ActionOutcome, AutoFixEngine, TriggeredAction};
pub use rules::{lint_rules, AutofixConfig, Rule, RuleIssue};
