//! Metrics snapshot model, flattening, and the metrics-source seam.
//!
//! A [`MetricsSnapshot`] is the nested `category -> metric -> value` mapping
//! produced by a collector on every poll. Rule triggers never look at the
//! nested form: the engine calls [`flatten`] once per cycle and evaluates all
//! rules against the resulting [`FlatMetrics`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Single-level metrics keyed by `"<category>_<metric>"`.
pub type FlatMetrics = BTreeMap<String, f64>;

/// A top-level snapshot entry: either a category of named metrics or a bare
/// value that flattens under its own key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Value(f64),
    Group(BTreeMap<String, f64>),
}

/// Nested metrics captured during one poll.
///
/// Serializes as a plain JSON object, e.g.
/// `{"cpu": {"usage_percent": 12.5}, "memory": {"percent": 40.1}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot {
    entries: BTreeMap<String, MetricValue>,
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`insert_group`](Self::insert_group).
    pub fn with_group<I, K>(mut self, category: impl Into<String>, metrics: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.insert_group(category, metrics);
        self
    }

    /// Builder-style variant of [`insert_value`](Self::insert_value).
    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert_value(key, value);
        self
    }

    /// Insert (or replace) a whole category.
    pub fn insert_group<I, K>(&mut self, category: impl Into<String>, metrics: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let group = metrics.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.entries
            .insert(category.into(), MetricValue::Group(group));
    }

    /// Insert (or replace) a bare top-level value.
    pub fn insert_value(&mut self, key: impl Into<String>, value: f64) {
        self.entries.insert(key.into(), MetricValue::Value(value));
    }

    /// Look up `category.metric`, returning `None` if either level is missing
    /// or the category is a bare value.
    pub fn get(&self, category: &str, metric: &str) -> Option<f64> {
        match self.entries.get(category)? {
            MetricValue::Group(group) => group.get(metric).copied(),
            MetricValue::Value(_) => None,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collapse a snapshot into single-level keys.
///
/// Group members become `"{category}_{metric}"`; bare values keep their key.
/// If a bare value and a derived key collide, the bare value wins, so the
/// result never depends on map iteration order.
pub fn flatten(snapshot: &MetricsSnapshot) -> FlatMetrics {
    let mut flat = FlatMetrics::new();

    for (category, value) in &snapshot.entries {
        if let MetricValue::Group(group) = value {
            for (metric, v) in group {
                flat.insert(format!("{category}_{metric}"), *v);
            }
        }
    }

    for (key, value) in &snapshot.entries {
        if let MetricValue::Value(v) = value {
            flat.insert(key.clone(), *v);
        }
    }

    flat
}

/// A single process row for top-N listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Owning user id, or `"unknown"` when the platform does not report it.
    pub user: String,
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub memory_percent: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MetricsError {
    #[error("metrics source unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can produce a fresh [`MetricsSnapshot`] on demand.
///
/// Implementations are picked once at startup and shared; the engine never
/// knows which backend is active.
pub trait MetricsSource: Send + Sync {
    /// Capture a fresh snapshot. Blocks until the backend answers.
    fn fetch(&self) -> Result<MetricsSnapshot, MetricsError>;

    /// The `limit` heaviest processes by CPU usage, descending.
    ///
    /// Sources without process visibility return an empty list.
    fn top_processes(&self, _limit: usize) -> Result<Vec<ProcessInfo>, MetricsError> {
        Ok(Vec::new())
    }
}

impl<T: MetricsSource + ?Sized> MetricsSource for std::sync::Arc<T> {
    fn fetch(&self) -> Result<MetricsSnapshot, MetricsError> {
        (**self).fetch()
    }

    fn top_processes(&self, limit: usize) -> Result<Vec<ProcessInfo>, MetricsError> {
        (**self).top_processes(limit)
    }
}

/// A source that always returns the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    snapshot: MetricsSnapshot,
    processes: Vec<ProcessInfo>,
}

impl StaticSource {
    pub fn new(snapshot: MetricsSnapshot) -> Self {
        Self {
            snapshot,
            processes: Vec::new(),
        }
    }

    pub fn with_processes(mut self, processes: Vec<ProcessInfo>) -> Self {
        self.processes = processes;
        self
    }
}

impl MetricsSource for StaticSource {
    fn fetch(&self) -> Result<MetricsSnapshot, MetricsError> {
        Ok(self.snapshot.clone())
    }

    fn top_processes(&self, limit: usize) -> Result<Vec<ProcessInfo>, MetricsError> {
        Ok(self.processes.iter().take(limit).cloned().collect())
    }
}
