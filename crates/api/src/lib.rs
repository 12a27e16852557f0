//! SysGuard API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! WebSocket streaming, background jobs) so integration tests and the binary
//! entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
