//! Handlers for room membership: `/rooms/{room_id}/members[/{member_id}]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use jukebox_core::error::CoreError;
use jukebox_core::room_events::EVENT_REFRESH_MEMBERS;
use jukebox_core::types::DbId;
use jukebox_core::validation::validate_member_name;
use jukebox_db::models::member::{JoinRoom, Member};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/rooms/{room_id}/members
pub async fn list_by_room(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Member>>>> {
    let members = state.rooms.list_members(room_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/rooms/{room_id}/members
pub async fn join(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
    Json(input): Json<JoinRoom>,
) -> AppResult<(StatusCode, Json<DataResponse<Member>>)> {
    validate_member_name(&input.name)?;

    let member = state
        .rooms
        .join_room(room_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::room_not_found(room_id)))?;

    tracing::info!(room_id, member_id = member.id, "Member joined");
    state.notifier.broadcast(room_id, EVENT_REFRESH_MEMBERS).await;
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// DELETE /api/v1/rooms/{room_id}/members/{member_id}
///
/// Idempotent: responds 204 whether or not the member was present.
pub async fn leave(
    State(state): State<AppState>,
    Path((room_id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if state.rooms.leave_room(room_id, member_id).await? {
        tracing::info!(room_id, member_id, "Member left");
        state.notifier.broadcast(room_id, EVENT_REFRESH_MEMBERS).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
