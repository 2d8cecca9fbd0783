//! Queue ordering and playback-expiry rules.
//!
//! A room's queue is every track with `played_at IS NULL`. The next track to
//! play is the one with the highest vote; equal votes go to whichever was
//! queued first, and equal creation times fall back to the lower id so the
//! order is total. The PostgreSQL store expresses the same order as
//! `ORDER BY vote DESC, created_at ASC, id ASC`.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// SQL `ORDER BY` clause matching [`QueueKey`]'s ordering.
pub const QUEUE_ORDER_SQL: &str = "vote DESC, created_at ASC, id ASC";

/// The fields of a queued track that decide its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueKey {
    pub vote: i32,
    pub created_at: Timestamp,
    pub id: DbId,
}

impl Ord for QueueKey {
    /// `Less` means "plays earlier".
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .vote
            .cmp(&self.vote)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// When a track that became current at `played_at` is scheduled to end.
///
/// Saturates at the latest representable instant, so a corrupt duration
/// keeps the track playing instead of overflowing.
pub fn scheduled_end(played_at: Timestamp, duration_ms: i64) -> Timestamp {
    Duration::try_milliseconds(duration_ms)
        .and_then(|duration| played_at.checked_add_signed(duration))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether a current track has finished playing at `now`.
///
/// The boundary is inclusive: a track whose scheduled end equals `now` is
/// finished and must be replaced.
pub fn has_finished(played_at: Timestamp, duration_ms: i64, now: Timestamp) -> bool {
    now >= scheduled_end(played_at, duration_ms)
}

/// Direction of a single vote on a queued track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Amount added to the track's score.
    pub fn delta(self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}
