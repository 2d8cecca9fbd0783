//! Jukebox real-time fan-out.
//!
//! - [`RoomHub`]: per-room publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, with explicit subscribe/unsubscribe.
//! - [`RoomEvent`]: the signal delivered to a room's subscribers.
//! - [`RoomNotifier`]: the broadcast seam the API and queue engine use.

pub mod hub;
pub mod notifier;

pub use hub::{RoomEvent, RoomHub};
pub use notifier::RoomNotifier;
