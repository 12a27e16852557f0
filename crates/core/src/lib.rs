//! `sysguard-core` -- pure domain logic for SysGuard.
//!
//! Metrics snapshots and flattening, the trigger-condition evaluator, the
//! autofix engine and action dispatch table, and the configuration file
//! schema. Nothing in here talks to the OS or the database except through
//! the [`metrics::MetricsSource`] and [`autofix::ActionExecutor`] traits.

pub mod alert;
pub mod autofix;
pub mod config;
pub mod error;
pub mod metric_names;
pub mod metrics;
pub mod types;
