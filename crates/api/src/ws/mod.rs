//! WebSocket infrastructure for real-time room updates.
//!
//! Provides connection management, heartbeat monitoring, and the HTTP
//! upgrade handler that subscribes a client to one room.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL_SECS};
pub use manager::WsManager;
