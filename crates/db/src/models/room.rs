//! Room entity model and DTOs.

use jukebox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rooms` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Room {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new room.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    pub name: String,
}
