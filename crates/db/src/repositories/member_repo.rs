//! Repository for the `members` table.

use jukebox_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{JoinRoom, Member};

const COLUMNS: &str = "id, room_id, name, joined_at";

/// Provides membership operations for rooms.
pub struct MemberRepo;

impl MemberRepo {
    /// Add a member to a room.
    ///
    /// Returns `None` if the room does not exist. A name already taken in
    /// the room violates `uq_members_room_name`.
    pub async fn join(
        pool: &PgPool,
        room_id: DbId,
        input: &JoinRoom,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (room_id, name) \
             SELECT $1, $2 \
             WHERE EXISTS (SELECT 1 FROM rooms WHERE id = $1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(room_id)
            .bind(input.name.trim())
            .fetch_optional(pool)
            .await
    }

    /// List a room's members in join order.
    pub async fn list_by_room(pool: &PgPool, room_id: DbId) -> Result<Vec<Member>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM members WHERE room_id = $1 ORDER BY joined_at, id");
        sqlx::query_as::<_, Member>(&query)
            .bind(room_id)
            .fetch_all(pool)
            .await
    }

    /// Remove a member. Returns `true` if a row was removed.
    pub async fn leave(pool: &PgPool, room_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1 AND room_id = $2")
            .bind(id)
            .bind(room_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
