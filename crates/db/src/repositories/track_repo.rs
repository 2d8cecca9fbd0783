//! Repository for the `tracks` table.

use jukebox_core::queue::QUEUE_ORDER_SQL;
use jukebox_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::track::{AdvanceOutcome, CreateTrack, CurrentGuard, Track, VoteTrack};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, room_id, title, source, vote, voters, duration_ms, created_at, played_at";

/// Serializes advancements of one room. `NO KEY UPDATE` leaves the foreign
/// key checks of concurrent track inserts (`FOR KEY SHARE`) unblocked.
const ROOM_LOCK_SQL: &str = "SELECT id FROM rooms WHERE id = $1 FOR NO KEY UPDATE";

/// Selects the room's current track. If more than one row is marked
/// current, the most recently started one wins.
fn current_query() -> String {
    format!(
        "SELECT {COLUMNS} FROM tracks \
         WHERE room_id = $1 AND played_at IS NOT NULL \
         ORDER BY played_at DESC, id DESC \
         LIMIT 1"
    )
}

/// Provides queue operations for tracks.
pub struct TrackRepo;

impl TrackRepo {
    /// Queue a new track in a room.
    ///
    /// Returns `None` if the room does not exist.
    pub async fn create(
        pool: &PgPool,
        room_id: DbId,
        input: &CreateTrack,
    ) -> Result<Option<Track>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tracks (room_id, title, source, duration_ms) \
             SELECT $1, $2, $3, $4 \
             WHERE EXISTS (SELECT 1 FROM rooms WHERE id = $1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(room_id)
            .bind(input.title.trim())
            .bind(input.source.trim())
            .bind(input.duration_ms)
            .fetch_optional(pool)
            .await
    }

    /// Find a track by id within a room.
    pub async fn find_by_id(
        pool: &PgPool,
        room_id: DbId,
        id: DbId,
    ) -> Result<Option<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1 AND room_id = $2");
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .bind(room_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the room's current track, if any.
    pub async fn find_current(pool: &PgPool, room_id: DbId) -> Result<Option<Track>, sqlx::Error> {
        sqlx::query_as::<_, Track>(&current_query())
            .bind(room_id)
            .fetch_optional(pool)
            .await
    }

    /// List the room's queued tracks in promotion order.
    pub async fn list_queued(pool: &PgPool, room_id: DbId) -> Result<Vec<Track>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tracks \
             WHERE room_id = $1 AND played_at IS NULL \
             ORDER BY {QUEUE_ORDER_SQL}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(room_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a track. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, room_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1 AND room_id = $2")
            .bind(id)
            .bind(room_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a vote to a queued track the voter has not voted on yet.
    ///
    /// The check and the write are one statement, so concurrent votes by
    /// the same voter cannot both land. Returns `None` when nothing was
    /// updated; the caller distinguishes why with [`find_by_id`](Self::find_by_id).
    pub async fn vote(
        pool: &PgPool,
        room_id: DbId,
        id: DbId,
        input: &VoteTrack,
    ) -> Result<Option<Track>, sqlx::Error> {
        let query = format!(
            "UPDATE tracks SET \
                vote = vote + $3, \
                voters = array_append(voters, $4) \
             WHERE id = $1 AND room_id = $2 \
               AND played_at IS NULL \
               AND NOT ($4 = ANY(voters)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .bind(room_id)
            .bind(input.direction.delta())
            .bind(input.voter.trim())
            .fetch_optional(pool)
            .await
    }

    /// Retire the room's current track and promote the head of the queue.
    ///
    /// Runs in one transaction holding the room row lock, so concurrent
    /// advancements of the same room are serialized. With
    /// [`CurrentGuard::Expect`], the room's current track is re-read under
    /// the lock and nothing is written unless it still matches.
    pub async fn advance(
        pool: &PgPool,
        room_id: DbId,
        guard: CurrentGuard,
        now: Timestamp,
    ) -> Result<AdvanceOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let room: Option<(DbId,)> = sqlx::query_as(ROOM_LOCK_SQL)
            .bind(room_id)
            .fetch_optional(&mut *tx)
            .await?;
        if room.is_none() {
            tx.commit().await?;
            return Ok(AdvanceOutcome::Advanced {
                promoted: None,
                retired: 0,
            });
        }

        if let CurrentGuard::Expect(_) = guard {
            let current = sqlx::query_as::<_, Track>(&current_query())
                .bind(room_id)
                .fetch_optional(&mut *tx)
                .await?;
            if !guard.admits(current.as_ref().map(|t| t.id)) {
                tx.commit().await?;
                return Ok(AdvanceOutcome::Superseded(current));
            }
        }

        let retired = sqlx::query("DELETE FROM tracks WHERE room_id = $1 AND played_at IS NOT NULL")
            .bind(room_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let query = format!(
            "UPDATE tracks SET played_at = $2 \
             WHERE id = ( \
                 SELECT id FROM tracks \
                 WHERE room_id = $1 AND played_at IS NULL \
                 ORDER BY {QUEUE_ORDER_SQL} \
                 LIMIT 1 \
             ) \
             RETURNING {COLUMNS}"
        );
        let promoted = sqlx::query_as::<_, Track>(&query)
            .bind(room_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AdvanceOutcome::Advanced { promoted, retired })
    }
}
