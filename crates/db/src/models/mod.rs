//! Row structs and insert DTOs.

pub mod alert;
pub mod metric_sample;
