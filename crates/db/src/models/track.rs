//! Track entity model, DTOs, and advancement outcomes.
//!
//! A track with `played_at = NULL` is queued; a non-null `played_at` marks
//! the room's current track and records when it started.

use jukebox_core::queue::{self, QueueKey, VoteDirection};
use jukebox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tracks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub room_id: DbId,
    pub title: String,
    pub source: String,
    pub vote: i32,
    pub voters: Vec<String>,
    pub duration_ms: i64,
    pub created_at: Timestamp,
    pub played_at: Option<Timestamp>,
}

impl Track {
    /// Whether this track is the room's current track.
    pub fn is_current(&self) -> bool {
        self.played_at.is_some()
    }

    /// Position key within the room's queue.
    pub fn queue_key(&self) -> QueueKey {
        QueueKey {
            vote: self.vote,
            created_at: self.created_at,
            id: self.id,
        }
    }

    /// When playback ends, or `None` for a queued track.
    pub fn scheduled_end(&self) -> Option<Timestamp> {
        self.played_at
            .map(|played_at| queue::scheduled_end(played_at, self.duration_ms))
    }

    /// Whether a current track has finished at `now`. Queued tracks never
    /// have.
    pub fn has_finished(&self, now: Timestamp) -> bool {
        self.played_at
            .is_some_and(|played_at| queue::has_finished(played_at, self.duration_ms, now))
    }
}

/// DTO for submitting a track to a room's queue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    pub source: String,
    pub duration_ms: i64,
}

/// DTO for voting on a queued track.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteTrack {
    pub voter: String,
    pub direction: VoteDirection,
}

/// Result of a vote attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// The vote was applied; carries the updated row.
    Recorded(Track),
    /// This voter has already voted on the track.
    AlreadyVoted,
    /// The track is the room's current track and no longer votable.
    NotQueued,
    /// No such track in the room.
    TrackNotFound,
}

/// Precondition on the room's current track for an advancement.
///
/// `Expect` turns the advancement into a compare-and-swap: it only proceeds
/// if the room's current track id still equals the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentGuard {
    /// Advance regardless of what is current (explicit skip).
    Any,
    /// Advance only if the current track id is this value (`None` = no current).
    Expect(Option<DbId>),
}

impl CurrentGuard {
    /// Whether the observed current track id satisfies the guard.
    pub fn admits(self, current_id: Option<DbId>) -> bool {
        match self {
            CurrentGuard::Any => true,
            CurrentGuard::Expect(expected) => expected == current_id,
        }
    }
}

/// Result of an advancement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Stale current rows were retired and the head of the queue (if any)
    /// became current.
    Advanced {
        promoted: Option<Track>,
        retired: u64,
    },
    /// The guard did not hold: another request changed the current track
    /// first. Carries the room's current track as observed. Nothing was
    /// written.
    Superseded(Option<Track>),
}

impl AdvanceOutcome {
    /// The room's current track after the attempt.
    pub fn into_current(self) -> Option<Track> {
        match self {
            AdvanceOutcome::Advanced { promoted, .. } => promoted,
            AdvanceOutcome::Superseded(current) => current,
        }
    }

    /// Whether the attempt wrote anything.
    pub fn changed(&self) -> bool {
        match self {
            AdvanceOutcome::Advanced { promoted, retired } => promoted.is_some() || *retired > 0,
            AdvanceOutcome::Superseded(_) => false,
        }
    }
}
