use async_trait::async_trait;
use jukebox_core::types::{DbId, Timestamp};

use super::{RoomStore, StoreResult, TrackStore};
use crate::models::member::{JoinRoom, Member};
use crate::models::room::{CreateRoom, Room};
use crate::models::track::{AdvanceOutcome, CreateTrack, CurrentGuard, Track, VoteOutcome, VoteTrack};
use crate::repositories::{MemberRepo, RoomRepo, TrackRepo};
use crate::DbPool;

/// PostgreSQL-backed store. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackStore for PgStore {
    async fn find_current(&self, room_id: DbId) -> StoreResult<Option<Track>> {
        Ok(TrackRepo::find_current(&self.pool, room_id).await?)
    }

    async fn list_queued(&self, room_id: DbId) -> StoreResult<Vec<Track>> {
        Ok(TrackRepo::list_queued(&self.pool, room_id).await?)
    }

    async fn find_track(&self, room_id: DbId, track_id: DbId) -> StoreResult<Option<Track>> {
        Ok(TrackRepo::find_by_id(&self.pool, room_id, track_id).await?)
    }

    async fn create_track(
        &self,
        room_id: DbId,
        input: &CreateTrack,
    ) -> StoreResult<Option<Track>> {
        Ok(TrackRepo::create(&self.pool, room_id, input).await?)
    }

    async fn delete_track(&self, room_id: DbId, track_id: DbId) -> StoreResult<bool> {
        Ok(TrackRepo::delete(&self.pool, room_id, track_id).await?)
    }

    async fn vote(
        &self,
        room_id: DbId,
        track_id: DbId,
        input: &VoteTrack,
    ) -> StoreResult<VoteOutcome> {
        if let Some(track) = TrackRepo::vote(&self.pool, room_id, track_id, input).await? {
            return Ok(VoteOutcome::Recorded(track));
        }
        // Nothing matched the conditional update; find out which condition failed.
        let outcome = match TrackRepo::find_by_id(&self.pool, room_id, track_id).await? {
            None => VoteOutcome::TrackNotFound,
            Some(track) if track.is_current() => VoteOutcome::NotQueued,
            Some(_) => VoteOutcome::AlreadyVoted,
        };
        Ok(outcome)
    }

    async fn advance(
        &self,
        room_id: DbId,
        guard: CurrentGuard,
        now: Timestamp,
    ) -> StoreResult<AdvanceOutcome> {
        Ok(TrackRepo::advance(&self.pool, room_id, guard, now).await?)
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    async fn create_room(&self, input: &CreateRoom) -> StoreResult<Room> {
        Ok(RoomRepo::create(&self.pool, input).await?)
    }

    async fn find_room(&self, room_id: DbId) -> StoreResult<Option<Room>> {
        Ok(RoomRepo::find_by_id(&self.pool, room_id).await?)
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        Ok(RoomRepo::list(&self.pool).await?)
    }

    async fn delete_room(&self, room_id: DbId) -> StoreResult<bool> {
        Ok(RoomRepo::delete(&self.pool, room_id).await?)
    }

    async fn list_members(&self, room_id: DbId) -> StoreResult<Vec<Member>> {
        Ok(MemberRepo::list_by_room(&self.pool, room_id).await?)
    }

    async fn join_room(&self, room_id: DbId, input: &JoinRoom) -> StoreResult<Option<Member>> {
        Ok(MemberRepo::join(&self.pool, room_id, input).await?)
    }

    async fn leave_room(&self, room_id: DbId, member_id: DbId) -> StoreResult<bool> {
        Ok(MemberRepo::leave(&self.pool, room_id, member_id).await?)
    }
}
