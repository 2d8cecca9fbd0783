//! Handlers for the `/rooms` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use jukebox_core::error::CoreError;
use jukebox_core::room_events::EVENT_ROOM_CLOSED;
use jukebox_core::types::DbId;
use jukebox_core::validation::validate_room_name;
use jukebox_db::models::room::{CreateRoom, Room};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/rooms
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<DataResponse<Room>>)> {
    validate_room_name(&input.name)?;
    let room = state.rooms.create_room(&input).await?;
    tracing::info!(room_id = room.id, name = %room.name, "Room created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}

/// GET /api/v1/rooms
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Room>>>> {
    let rooms = state.rooms.list_rooms().await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/rooms/{room_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Room>>> {
    let room = state
        .rooms
        .find_room(room_id)
        .await?
        .ok_or(AppError::Core(CoreError::room_not_found(room_id)))?;
    Ok(Json(DataResponse { data: room }))
}

/// DELETE /api/v1/rooms/{room_id}
///
/// Removes the room with its tracks and members, tells subscribers the room
/// is gone, then closes its event channel.
pub async fn delete(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !state.rooms.delete_room(room_id).await? {
        return Err(AppError::Core(CoreError::room_not_found(room_id)));
    }

    tracing::info!(room_id, "Room deleted");
    state.notifier.broadcast(room_id, EVENT_ROOM_CLOSED).await;
    state.hub.close_room(room_id).await;
    Ok(StatusCode::NO_CONTENT)
}
