//! Event names broadcast to room subscribers.
//!
//! Clients treat every event as a hint to re-fetch state; none of them carry
//! a payload beyond the room id.

/// The room's queue or current track changed.
pub const EVENT_REFRESH_TRACKS: &str = "REFRESH_TRACKS";

/// A member joined or left the room.
pub const EVENT_REFRESH_MEMBERS: &str = "REFRESH_MEMBERS";

/// The room was deleted; subscribers should disconnect.
pub const EVENT_ROOM_CLOSED: &str = "ROOM_CLOSED";
