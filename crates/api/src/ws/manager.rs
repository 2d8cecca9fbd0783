use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use chrono::Utc;
use jukebox_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Outbound control-frame queue of one socket.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// A live room socket, keyed by connection id in [`WsManager`].
pub struct WsConnection {
    pub room_id: DbId,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Registry of open room sockets.
///
/// Room events travel through each socket's own
/// [`RoomHub`](jukebox_events::RoomHub) subscription. The registry is for
/// traffic that targets every socket at once: heartbeat pings and the Close
/// frames sent on shutdown.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a socket joining `room_id`.
    ///
    /// The returned receiver yields the control frames queued for it.
    pub async fn add(&self, conn_id: String, room_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.connections.write().await.insert(
            conn_id,
            WsConnection {
                room_id,
                sender,
                connected_at: Utc::now(),
            },
        );
        receiver
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Open sockets across all rooms, as reported by `/health`.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Open sockets listening to one room.
    pub async fn room_connection_count(&self, room_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.room_id == room_id)
            .count()
    }

    /// Queue a Close frame for every socket and forget them all.
    pub async fn shutdown_all(&self) {
        let mut connections = self.connections.write().await;
        let count = connections.len();
        for (_, conn) in connections.drain() {
            // A closed queue means the socket is already going away.
            let _ = conn.sender.send(Message::Close(None));
        }
        tracing::info!(count, "Closed room sockets for shutdown");
    }

    /// Queue a Ping frame for every socket.
    pub async fn ping_all(&self) {
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
