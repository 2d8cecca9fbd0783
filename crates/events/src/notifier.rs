use async_trait::async_trait;
use jukebox_core::types::DbId;

/// Fire-and-forget broadcast to everyone listening on a room.
///
/// No delivery guarantee: with no listeners the signal is dropped, and slow
/// listeners may miss signals. Listeners are expected to re-fetch state on
/// every signal rather than rely on counting them.
#[async_trait]
pub trait RoomNotifier: Send + Sync {
    async fn broadcast(&self, room_id: DbId, event: &str);
}
