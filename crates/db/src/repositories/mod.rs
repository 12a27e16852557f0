//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod alert_repo;
pub mod metric_sample_repo;

pub use alert_repo::AlertRepo;
pub use metric_sample_repo::MetricSampleRepo;
