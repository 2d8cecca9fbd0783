//! Store seams for the queue engine and the HTTP layer.
//!
//! [`TrackStore`] and [`RoomStore`] are the only way the rest of the system
//! reaches persistence. Two implementations exist:
//!
//! - [`PgStore`] delegates to the repositories over a PostgreSQL pool.
//! - [`MemoryStore`] keeps everything in process, for tests and fixtures.

mod memory;
mod postgres;

use async_trait::async_trait;
use jukebox_core::types::{DbId, Timestamp};

use crate::models::member::{JoinRoom, Member};
use crate::models::room::{CreateRoom, Room};
use crate::models::track::{AdvanceOutcome, CreateTrack, CurrentGuard, Track, VoteOutcome, VoteTrack};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors surfaced by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the query failed.
    #[error("Store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A write collided with a unique constraint.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for StoreError {
    /// Unique violations on `uq_`-prefixed constraints become
    /// [`StoreError::Conflict`]; everything else is
    /// [`StoreError::Unavailable`].
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                    return StoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    ));
                }
            }
        }
        StoreError::Unavailable(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Query/insert/delete/update over track rows.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// The room's current track. With several marked current, the most
    /// recently started one.
    async fn find_current(&self, room_id: DbId) -> StoreResult<Option<Track>>;

    /// The room's queued tracks in promotion order.
    async fn list_queued(&self, room_id: DbId) -> StoreResult<Vec<Track>>;

    async fn find_track(&self, room_id: DbId, track_id: DbId) -> StoreResult<Option<Track>>;

    /// Queue a track. `None` if the room does not exist.
    async fn create_track(&self, room_id: DbId, input: &CreateTrack)
        -> StoreResult<Option<Track>>;

    /// Delete a track. `true` if it existed.
    async fn delete_track(&self, room_id: DbId, track_id: DbId) -> StoreResult<bool>;

    async fn vote(&self, room_id: DbId, track_id: DbId, input: &VoteTrack)
        -> StoreResult<VoteOutcome>;

    /// Atomically retire the current track and promote the head of the
    /// queue, stamping it with `now`, provided `guard` holds.
    async fn advance(
        &self,
        room_id: DbId,
        guard: CurrentGuard,
        now: Timestamp,
    ) -> StoreResult<AdvanceOutcome>;
}

/// Rooms and their members.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Reachability check used by `/health`.
    async fn ping(&self) -> StoreResult<()>;

    async fn create_room(&self, input: &CreateRoom) -> StoreResult<Room>;

    async fn find_room(&self, room_id: DbId) -> StoreResult<Option<Room>>;

    async fn list_rooms(&self) -> StoreResult<Vec<Room>>;

    /// Delete a room with its tracks and members. `true` if it existed.
    async fn delete_room(&self, room_id: DbId) -> StoreResult<bool>;

    async fn list_members(&self, room_id: DbId) -> StoreResult<Vec<Member>>;

    /// Add a member. `None` if the room does not exist.
    async fn join_room(&self, room_id: DbId, input: &JoinRoom) -> StoreResult<Option<Member>>;

    /// Remove a member. `true` if they were present.
    async fn leave_room(&self, room_id: DbId, member_id: DbId) -> StoreResult<bool>;
}
