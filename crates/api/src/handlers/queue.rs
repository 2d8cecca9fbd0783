//! Playback endpoints backed by [`QueueAdvancer`](crate::engine::QueueAdvancer).

use axum::extract::{Path, State};
use axum::Json;
use jukebox_core::types::DbId;
use jukebox_db::models::track::Track;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/rooms/{room_id}/current
///
/// The track playing now, promoting the next one first if nothing is
/// playing or the current track has run its course. `data` is `null` when
/// the room has nothing left to play.
pub async fn current(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<Track>>>> {
    let track = state.advancer.get_current_or_next(room_id).await?;
    Ok(Json(DataResponse { data: track }))
}

/// POST /api/v1/rooms/{room_id}/advance
///
/// Skip whatever is playing and promote the next queued track.
pub async fn advance(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<Track>>>> {
    let track = state.advancer.advance(room_id).await?;
    Ok(Json(DataResponse { data: track }))
}
