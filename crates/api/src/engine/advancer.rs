use std::sync::Arc;

use chrono::Utc;
use jukebox_core::room_events::EVENT_REFRESH_TRACKS;
use jukebox_core::types::{DbId, Timestamp};
use jukebox_db::models::track::{AdvanceOutcome, CurrentGuard, Track};
use jukebox_db::store::{StoreResult, TrackStore};
use jukebox_events::RoomNotifier;

/// Selects and retires each room's current track.
///
/// The advancer itself is stateless; all coordination between concurrent
/// requests happens in [`TrackStore::advance`], which applies the
/// retire-and-promote transition atomically under a [`CurrentGuard`].
pub struct QueueAdvancer {
    tracks: Arc<dyn TrackStore>,
    notifier: Arc<dyn RoomNotifier>,
}

impl QueueAdvancer {
    pub fn new(tracks: Arc<dyn TrackStore>, notifier: Arc<dyn RoomNotifier>) -> Self {
        Self { tracks, notifier }
    }

    /// Return the room's current track, advancing first if there is none or
    /// it has finished playing.
    pub async fn get_current_or_next(&self, room_id: DbId) -> StoreResult<Option<Track>> {
        self.get_current_or_next_at(room_id, Utc::now()).await
    }

    /// [`get_current_or_next`](Self::get_current_or_next) evaluated at `now`.
    ///
    /// A current track that is still playing is returned without touching
    /// the store.
    pub async fn get_current_or_next_at(
        &self,
        room_id: DbId,
        now: Timestamp,
    ) -> StoreResult<Option<Track>> {
        match self.tracks.find_current(room_id).await? {
            None => self.transition(room_id, CurrentGuard::Expect(None), now).await,
            Some(current) if current.has_finished(now) => {
                tracing::debug!(
                    room_id,
                    track_id = current.id,
                    ended_at = ?current.scheduled_end(),
                    "Current track finished"
                );
                self.transition(room_id, CurrentGuard::Expect(Some(current.id)), now)
                    .await
            }
            Some(current) => Ok(Some(current)),
        }
    }

    /// Skip to the next track regardless of what is playing.
    pub async fn advance(&self, room_id: DbId) -> StoreResult<Option<Track>> {
        self.advance_at(room_id, Utc::now()).await
    }

    /// [`advance`](Self::advance) with the promoted track stamped `now`.
    pub async fn advance_at(&self, room_id: DbId, now: Timestamp) -> StoreResult<Option<Track>> {
        self.transition(room_id, CurrentGuard::Any, now).await
    }

    async fn transition(
        &self,
        room_id: DbId,
        guard: CurrentGuard,
        now: Timestamp,
    ) -> StoreResult<Option<Track>> {
        let outcome = self.tracks.advance(room_id, guard, now).await?;

        match &outcome {
            AdvanceOutcome::Advanced { promoted, retired } => tracing::info!(
                room_id,
                retired,
                promoted_track_id = ?promoted.as_ref().map(|t| t.id),
                "Queue advanced"
            ),
            AdvanceOutcome::Superseded(current) => tracing::debug!(
                room_id,
                current_track_id = ?current.as_ref().map(|t| t.id),
                "Queue already advanced by another request"
            ),
        }

        if outcome.changed() {
            self.notifier.broadcast(room_id, EVENT_REFRESH_TRACKS).await;
        }
        Ok(outcome.into_current())
    }
}
