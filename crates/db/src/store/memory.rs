use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use jukebox_core::types::{DbId, Timestamp};

use super::{RoomStore, StoreError, StoreResult, TrackStore};
use crate::models::member::{JoinRoom, Member};
use crate::models::room::{CreateRoom, Room};
use crate::models::track::{AdvanceOutcome, CreateTrack, CurrentGuard, Track, VoteOutcome, VoteTrack};

#[derive(Default)]
struct State {
    next_id: DbId,
    rooms: BTreeMap<DbId, Room>,
    tracks: BTreeMap<DbId, Track>,
    members: BTreeMap<DbId, Member>,
    /// Number of write operations that changed at least one row.
    mutations: u64,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn current(&self, room_id: DbId) -> Option<&Track> {
        self.tracks
            .values()
            .filter(|t| t.room_id == room_id && t.is_current())
            .max_by_key(|t| (t.played_at, t.id))
    }

    fn queued(&self, room_id: DbId) -> Vec<&Track> {
        let mut queued: Vec<&Track> = self
            .tracks
            .values()
            .filter(|t| t.room_id == room_id && !t.is_current())
            .collect();
        queued.sort_by_key(|t| t.queue_key());
        queued
    }
}

/// In-process store with the same semantics as [`PgStore`](super::PgStore).
///
/// Every operation runs under one mutex, so advancement is atomic exactly
/// as the PostgreSQL transaction is. Used by tests and local fixtures.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a fully formed track row as-is, keeping its id and
    /// timestamps. For fixtures that need exact votes or times.
    ///
    /// Does not count as a mutation.
    pub fn insert_track(&self, track: Track) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(track.id);
        state.tracks.insert(track.id, track);
    }

    /// Insert a room row as-is. Does not count as a mutation.
    pub fn insert_room(&self, room: Room) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(room.id);
        state.rooms.insert(room.id, room);
    }

    /// How many writes have changed stored rows so far.
    pub fn mutation_count(&self) -> u64 {
        self.lock().mutations
    }
}

#[async_trait]
impl TrackStore for MemoryStore {
    async fn find_current(&self, room_id: DbId) -> StoreResult<Option<Track>> {
        Ok(self.lock().current(room_id).cloned())
    }

    async fn list_queued(&self, room_id: DbId) -> StoreResult<Vec<Track>> {
        Ok(self.lock().queued(room_id).into_iter().cloned().collect())
    }

    async fn find_track(&self, room_id: DbId, track_id: DbId) -> StoreResult<Option<Track>> {
        Ok(self
            .lock()
            .tracks
            .get(&track_id)
            .filter(|t| t.room_id == room_id)
            .cloned())
    }

    async fn create_track(
        &self,
        room_id: DbId,
        input: &CreateTrack,
    ) -> StoreResult<Option<Track>> {
        let mut state = self.lock();
        if !state.rooms.contains_key(&room_id) {
            return Ok(None);
        }
        let track = Track {
            id: state.next_id(),
            room_id,
            title: input.title.trim().to_string(),
            source: input.source.trim().to_string(),
            vote: 0,
            voters: Vec::new(),
            duration_ms: input.duration_ms,
            created_at: Utc::now(),
            played_at: None,
        };
        state.tracks.insert(track.id, track.clone());
        state.mutations += 1;
        Ok(Some(track))
    }

    async fn delete_track(&self, room_id: DbId, track_id: DbId) -> StoreResult<bool> {
        let mut state = self.lock();
        let owned = state
            .tracks
            .get(&track_id)
            .is_some_and(|t| t.room_id == room_id);
        if owned {
            state.tracks.remove(&track_id);
            state.mutations += 1;
        }
        Ok(owned)
    }

    async fn vote(
        &self,
        room_id: DbId,
        track_id: DbId,
        input: &VoteTrack,
    ) -> StoreResult<VoteOutcome> {
        let mut state = self.lock();
        let voter = input.voter.trim();
        let Some(track) = state
            .tracks
            .get_mut(&track_id)
            .filter(|t| t.room_id == room_id)
        else {
            return Ok(VoteOutcome::TrackNotFound);
        };
        if track.is_current() {
            return Ok(VoteOutcome::NotQueued);
        }
        if track.voters.iter().any(|v| v == voter) {
            return Ok(VoteOutcome::AlreadyVoted);
        }
        track.vote += input.direction.delta();
        track.voters.push(voter.to_string());
        let updated = track.clone();
        state.mutations += 1;
        Ok(VoteOutcome::Recorded(updated))
    }

    async fn advance(
        &self,
        room_id: DbId,
        guard: CurrentGuard,
        now: Timestamp,
    ) -> StoreResult<AdvanceOutcome> {
        let mut state = self.lock();
        if !state.rooms.contains_key(&room_id) {
            return Ok(AdvanceOutcome::Advanced {
                promoted: None,
                retired: 0,
            });
        }

        let current = state.current(room_id).cloned();
        if !guard.admits(current.as_ref().map(|t| t.id)) {
            return Ok(AdvanceOutcome::Superseded(current));
        }

        let before = state.tracks.len();
        state
            .tracks
            .retain(|_, t| !(t.room_id == room_id && t.is_current()));
        let retired = (before - state.tracks.len()) as u64;

        let head = state.queued(room_id).first().map(|t| t.id);
        let promoted = head.and_then(|id| state.tracks.get_mut(&id)).map(|track| {
            track.played_at = Some(now);
            track.clone()
        });

        if retired > 0 || promoted.is_some() {
            state.mutations += 1;
        }
        Ok(AdvanceOutcome::Advanced { promoted, retired })
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_room(&self, input: &CreateRoom) -> StoreResult<Room> {
        let mut state = self.lock();
        let name = input.name.trim();
        if state.rooms.values().any(|r| r.name == name) {
            return Err(StoreError::Conflict(
                "Duplicate value violates unique constraint: uq_rooms_name".to_string(),
            ));
        }
        let room = Room {
            id: state.next_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.rooms.insert(room.id, room.clone());
        state.mutations += 1;
        Ok(room)
    }

    async fn find_room(&self, room_id: DbId) -> StoreResult<Option<Room>> {
        Ok(self.lock().rooms.get(&room_id).cloned())
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        let mut rooms: Vec<Room> = self.lock().rooms.values().cloned().collect();
        rooms.sort_by_key(|r| (r.created_at, r.id));
        Ok(rooms)
    }

    async fn delete_room(&self, room_id: DbId) -> StoreResult<bool> {
        let mut state = self.lock();
        if state.rooms.remove(&room_id).is_none() {
            return Ok(false);
        }
        state.tracks.retain(|_, t| t.room_id != room_id);
        state.members.retain(|_, m| m.room_id != room_id);
        state.mutations += 1;
        Ok(true)
    }

    async fn list_members(&self, room_id: DbId) -> StoreResult<Vec<Member>> {
        let mut members: Vec<Member> = self
            .lock()
            .members
            .values()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.id));
        Ok(members)
    }

    async fn join_room(&self, room_id: DbId, input: &JoinRoom) -> StoreResult<Option<Member>> {
        let mut state = self.lock();
        if !state.rooms.contains_key(&room_id) {
            return Ok(None);
        }
        let name = input.name.trim();
        if state
            .members
            .values()
            .any(|m| m.room_id == room_id && m.name == name)
        {
            return Err(StoreError::Conflict(
                "Duplicate value violates unique constraint: uq_members_room_name".to_string(),
            ));
        }
        let member = Member {
            id: state.next_id(),
            room_id,
            name: name.to_string(),
            joined_at: Utc::now(),
        };
        state.members.insert(member.id, member.clone());
        state.mutations += 1;
        Ok(Some(member))
    }

    async fn leave_room(&self, room_id: DbId, member_id: DbId) -> StoreResult<bool> {
        let mut state = self.lock();
        let present = state
            .members
            .get(&member_id)
            .is_some_and(|m| m.room_id == room_id);
        if present {
            state.members.remove(&member_id);
            state.mutations += 1;
        }
        Ok(present)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use jukebox_core::queue::VoteDirection;

    use super::*;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn store_with_room() -> (MemoryStore, DbId) {
        let store = MemoryStore::new();
        store.insert_room(Room {
            id: 1,
            name: "lobby".into(),
            created_at: at(0),
        });
        (store, 1)
    }

    fn fixture(id: DbId, room_id: DbId, vote: i32, created: i64, played: Option<i64>) -> Track {
        Track {
            id,
            room_id,
            title: format!("track {id}"),
            source: format!("src:{id}"),
            vote,
            voters: vec![],
            duration_ms: 60_000,
            created_at: at(created),
            played_at: played.map(at),
        }
    }

    fn up(voter: &str) -> VoteTrack {
        VoteTrack {
            voter: voter.into(),
            direction: VoteDirection::Up,
        }
    }

    #[tokio::test]
    async fn create_track_in_missing_room_returns_none() {
        let store = MemoryStore::new();
        let input = CreateTrack {
            title: "a".into(),
            source: "b".into(),
            duration_ms: 1,
        };
        assert_eq!(store.create_track(42, &input).await.unwrap(), None);
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn create_track_trims_and_queues() {
        let (store, room) = store_with_room();
        let input = CreateTrack {
            title: "  Song  ".into(),
            source: " yt:abc ".into(),
            duration_ms: 1_000,
        };
        let track = store.create_track(room, &input).await.unwrap().unwrap();
        assert_eq!(track.title, "Song");
        assert_eq!(track.source, "yt:abc");
        assert_eq!(track.vote, 0);
        assert!(!track.is_current());
        assert_eq!(store.list_queued(room).await.unwrap(), vec![track]);
    }

    #[tokio::test]
    async fn list_queued_follows_promotion_order_and_skips_current() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(10, room, 3, 2, None));
        store.insert_track(fixture(11, room, 5, 1, None));
        store.insert_track(fixture(12, room, 5, 0, None));
        store.insert_track(fixture(13, room, 9, 0, Some(5)));
        let ids: Vec<DbId> = store
            .list_queued(room)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![12, 11, 10]);
    }

    #[tokio::test]
    async fn find_current_prefers_most_recently_played() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(1, room, 0, 0, Some(10)));
        store.insert_track(fixture(2, room, 0, 0, Some(20)));
        let current = store.find_current(room).await.unwrap().unwrap();
        assert_eq!(current.id, 2);
    }

    #[tokio::test]
    async fn vote_records_once_per_voter() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(5, room, 0, 0, None));

        let first = store.vote(room, 5, &up("alice")).await.unwrap();
        assert_matches!(first, VoteOutcome::Recorded(ref t) if t.vote == 1 && t.voters == vec!["alice".to_string()]);

        let again = store.vote(room, 5, &up("alice")).await.unwrap();
        assert_eq!(again, VoteOutcome::AlreadyVoted);

        let down = VoteTrack {
            voter: "bob".into(),
            direction: VoteDirection::Down,
        };
        let second = store.vote(room, 5, &down).await.unwrap();
        assert_matches!(second, VoteOutcome::Recorded(t) if t.vote == 0);
    }

    #[tokio::test]
    async fn vote_on_current_or_missing_track_is_rejected() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(5, room, 0, 0, Some(1)));
        assert_eq!(store.vote(room, 5, &up("a")).await.unwrap(), VoteOutcome::NotQueued);
        assert_eq!(store.vote(room, 99, &up("a")).await.unwrap(), VoteOutcome::TrackNotFound);
        assert_eq!(store.vote(2, 5, &up("a")).await.unwrap(), VoteOutcome::TrackNotFound);
    }

    #[tokio::test]
    async fn advance_retires_all_current_and_promotes_head() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(1, room, 0, 0, Some(1)));
        store.insert_track(fixture(2, room, 0, 0, Some(2)));
        store.insert_track(fixture(3, room, 1, 0, None));
        store.insert_track(fixture(4, room, 2, 1, None));

        let now = at(100);
        let outcome = store.advance(room, CurrentGuard::Any, now).await.unwrap();
        assert_matches!(
            outcome,
            AdvanceOutcome::Advanced { promoted: Some(ref t), retired: 2 } if t.id == 4 && t.played_at == Some(now)
        );
        assert_eq!(store.find_current(room).await.unwrap().map(|t| t.id), Some(4));
        assert_eq!(store.find_track(room, 1).await.unwrap(), None);
        assert_eq!(store.mutation_count(), 1);
    }

    #[tokio::test]
    async fn advance_with_stale_guard_writes_nothing() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(1, room, 0, 0, Some(1)));
        store.insert_track(fixture(2, room, 0, 0, None));

        let outcome = store
            .advance(room, CurrentGuard::Expect(Some(7)), at(100))
            .await
            .unwrap();
        assert_matches!(outcome, AdvanceOutcome::Superseded(Some(ref t)) if t.id == 1);
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn advance_on_empty_room_changes_nothing() {
        let (store, room) = store_with_room();
        let outcome = store
            .advance(room, CurrentGuard::Expect(None), at(1))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                promoted: None,
                retired: 0
            }
        );
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn advance_is_scoped_to_the_room() {
        let (store, room) = store_with_room();
        store.insert_room(Room {
            id: 2,
            name: "other".into(),
            created_at: at(0),
        });
        store.insert_track(fixture(3, 2, 0, 0, Some(1)));
        store.insert_track(fixture(4, 2, 0, 0, None));

        store.advance(room, CurrentGuard::Any, at(5)).await.unwrap();
        assert_eq!(store.find_current(2).await.unwrap().map(|t| t.id), Some(3));
        assert_eq!(store.list_queued(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_room_and_member_names_conflict() {
        let (store, room) = store_with_room();
        let dup = store
            .create_room(&CreateRoom {
                name: " lobby ".into(),
            })
            .await;
        assert_matches!(dup, Err(StoreError::Conflict(msg)) if msg.contains("uq_rooms_name"));

        let join = JoinRoom { name: "ann".into() };
        assert!(store.join_room(room, &join).await.unwrap().is_some());
        assert_matches!(
            store.join_room(room, &join).await,
            Err(StoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn delete_room_cascades() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(5, room, 0, 0, None));
        store
            .join_room(room, &JoinRoom { name: "ann".into() })
            .await
            .unwrap();

        assert!(store.delete_room(room).await.unwrap());
        assert!(store.list_queued(room).await.unwrap().is_empty());
        assert!(store.list_members(room).await.unwrap().is_empty());
        assert!(!store.delete_room(room).await.unwrap());
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let (store, room) = store_with_room();
        let member = store
            .join_room(room, &JoinRoom { name: "ann".into() })
            .await
            .unwrap()
            .unwrap();
        assert!(store.leave_room(room, member.id).await.unwrap());
        assert!(!store.leave_room(room, member.id).await.unwrap());
    }

    #[tokio::test]
    async fn promoted_track_keeps_its_duration() {
        let (store, room) = store_with_room();
        store.insert_track(fixture(1, room, 0, 0, None));
        let now = at(50);
        let promoted = store
            .advance(room, CurrentGuard::Expect(None), now)
            .await
            .unwrap()
            .into_current()
            .unwrap();
        assert_eq!(promoted.scheduled_end(), Some(now + Duration::seconds(60)));
    }
}
