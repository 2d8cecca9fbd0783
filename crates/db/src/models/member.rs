//! Room member model and DTOs.
//!
//! Members are display names scoped to a room. There is no account model
//! behind them.

use jukebox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `members` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub room_id: DbId,
    pub name: String,
    pub joined_at: Timestamp,
}

/// DTO for joining a room.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoom {
    pub name: String,
}
