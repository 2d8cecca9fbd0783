//! Per-room event hub backed by `tokio::sync::broadcast` channels.
//!
//! [`RoomHub`] owns one broadcast channel per room that currently has
//! subscribers. It is designed to be shared via `Arc<RoomHub>` across the
//! application.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use jukebox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::notifier::RoomNotifier;

// ---------------------------------------------------------------------------
// RoomEvent
// ---------------------------------------------------------------------------

/// A signal delivered to every subscriber of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// Event name, e.g. `"REFRESH_TRACKS"`.
    pub event: String,

    /// The room the event concerns.
    pub room_id: DbId,

    /// When the event was raised (UTC).
    pub timestamp: Timestamp,
}

impl RoomEvent {
    pub fn new(room_id: DbId, event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            room_id,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomHub
// ---------------------------------------------------------------------------

/// Default buffer capacity for each room's channel.
const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out hub keyed by room.
///
/// Channels are created on first subscription and dropped by
/// [`unsubscribe`](Self::unsubscribe) once the last receiver goes away, so
/// the map only holds rooms someone is listening to.
///
/// # Usage
///
/// ```rust
/// use jukebox_events::{RoomEvent, RoomHub};
///
/// # async fn demo() {
/// let hub = RoomHub::default();
/// let rx = hub.subscribe(7).await;
///
/// hub.publish(RoomEvent::new(7, "REFRESH_TRACKS")).await;
///
/// hub.unsubscribe(7, rx).await;
/// # }
/// ```
pub struct RoomHub {
    capacity: usize,
    rooms: RwLock<HashMap<DbId, broadcast::Sender<RoomEvent>>>,
}

impl RoomHub {
    /// Create a hub whose per-room channels buffer `capacity` events.
    ///
    /// When a room's buffer is full, the oldest un-consumed events are
    /// dropped and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Start listening to a room.
    pub async fn subscribe(&self, room_id: DbId) -> broadcast::Receiver<RoomEvent> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Stop listening to a room.
    ///
    /// Consumes the receiver and drops the room's channel if it was the
    /// last one.
    pub async fn unsubscribe(&self, room_id: DbId, receiver: broadcast::Receiver<RoomEvent>) {
        drop(receiver);
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(&room_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            rooms.remove(&room_id);
            tracing::debug!(room_id, "Dropped idle room channel");
        }
    }

    /// Deliver an event to the room's current subscribers.
    ///
    /// Returns how many receivers it reached. With no subscribers the event
    /// is silently dropped.
    pub async fn publish(&self, event: RoomEvent) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(&event.room_id) {
            // A SendError only means every receiver is gone.
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop the room's channel. Subscribers drain what is buffered and then
    /// observe `RecvError::Closed`.
    pub async fn close_room(&self, room_id: DbId) {
        if self.rooms.write().await.remove(&room_id).is_some() {
            tracing::debug!(room_id, "Closed room channel");
        }
    }

    /// Number of rooms with at least one live channel.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Number of receivers currently subscribed to a room.
    pub async fn subscriber_count(&self, room_id: DbId) -> usize {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl RoomNotifier for RoomHub {
    async fn broadcast(&self, room_id: DbId, event: &str) {
        let reached = self.publish(RoomEvent::new(room_id, event)).await;
        tracing::debug!(room_id, event, reached, "Room event broadcast");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
