//! Long-running jobs spawned at startup alongside the HTTP server.

pub mod metrics_retention;
