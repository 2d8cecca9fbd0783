//! Queue playback engine.
//!
//! [`QueueAdvancer`] decides when a room's current track has finished and
//! drives the store's atomic advancement.

mod advancer;

pub use advancer::QueueAdvancer;
