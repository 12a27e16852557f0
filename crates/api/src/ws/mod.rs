//! WebSocket metric streaming.
//!
//! Clients connect to `/api/v1/ws` and receive a `metrics` message every
//! stream interval, plus a ping every 30 seconds. Inbound messages other than
//! close/pong are ignored.

pub mod broadcaster;
mod handler;
mod heartbeat;
pub mod manager;

pub use broadcaster::start_broadcaster;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
