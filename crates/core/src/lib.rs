//! Domain types and rules shared by every Jukebox crate.
//!
//! Nothing in here touches the database or the network: the queue ordering
//! and playback-expiry rules live in [`queue`] so the stores and the
//! advancer agree on a single definition.

pub mod error;
pub mod queue;
pub mod room_events;
pub mod types;
pub mod validation;
