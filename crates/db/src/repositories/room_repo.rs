//! Repository for the `rooms` table.

use jukebox_core::types::DbId;
use sqlx::PgPool;

use crate::models::room::{CreateRoom, Room};

const COLUMNS: &str = "id, name, created_at";

/// Provides CRUD operations for rooms.
pub struct RoomRepo;

impl RoomRepo {
    /// Insert a new room, returning the created row.
    ///
    /// A duplicate name violates `uq_rooms_name`.
    pub async fn create(pool: &PgPool, input: &CreateRoom) -> Result<Room, sqlx::Error> {
        let query = format!("INSERT INTO rooms (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Room>(&query)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all rooms, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms ORDER BY created_at, id");
        sqlx::query_as::<_, Room>(&query).fetch_all(pool).await
    }

    /// Delete a room together with its tracks and members (cascade).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
