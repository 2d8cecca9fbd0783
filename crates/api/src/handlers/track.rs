//! Handlers for tracks nested under rooms:
//! `/rooms/{room_id}/tracks[/{track_id}[/vote]]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use jukebox_core::error::CoreError;
use jukebox_core::room_events::EVENT_REFRESH_TRACKS;
use jukebox_core::types::DbId;
use jukebox_core::validation::{validate_track, validate_voter};
use jukebox_db::models::track::{CreateTrack, Track, VoteOutcome, VoteTrack};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/rooms/{room_id}/tracks
///
/// Queued tracks in the order they will play. The current track is not
/// included; see `GET /rooms/{room_id}/current`.
pub async fn list_queue(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Track>>>> {
    let tracks = state.tracks.list_queued(room_id).await?;
    Ok(Json(DataResponse { data: tracks }))
}

/// POST /api/v1/rooms/{room_id}/tracks
pub async fn create(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
    Json(input): Json<CreateTrack>,
) -> AppResult<(StatusCode, Json<DataResponse<Track>>)> {
    validate_track(&input.title, &input.source, input.duration_ms)?;

    let track = state
        .tracks
        .create_track(room_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::room_not_found(room_id)))?;

    tracing::info!(room_id, track_id = track.id, "Track queued");
    state.notifier.broadcast(room_id, EVENT_REFRESH_TRACKS).await;
    Ok((StatusCode::CREATED, Json(DataResponse { data: track })))
}

/// DELETE /api/v1/rooms/{room_id}/tracks/{track_id}
///
/// Idempotent: responds 204 whether or not the track existed.
pub async fn delete(
    State(state): State<AppState>,
    Path((room_id, track_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if state.tracks.delete_track(room_id, track_id).await? {
        tracing::info!(room_id, track_id, "Track removed");
        state.notifier.broadcast(room_id, EVENT_REFRESH_TRACKS).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/rooms/{room_id}/tracks/{track_id}/vote
///
/// Each voter may vote once per track, and only while it is queued.
pub async fn vote(
    State(state): State<AppState>,
    Path((room_id, track_id)): Path<(DbId, DbId)>,
    Json(input): Json<VoteTrack>,
) -> AppResult<Json<DataResponse<Track>>> {
    validate_voter(&input.voter)?;

    match state.tracks.vote(room_id, track_id, &input).await? {
        VoteOutcome::Recorded(track) => {
            tracing::debug!(room_id, track_id, vote = track.vote, "Vote recorded");
            state.notifier.broadcast(room_id, EVENT_REFRESH_TRACKS).await;
            Ok(Json(DataResponse { data: track }))
        }
        VoteOutcome::AlreadyVoted => Err(AppError::Core(CoreError::Conflict(format!(
            "'{}' has already voted on track {track_id}",
            input.voter.trim()
        )))),
        VoteOutcome::NotQueued => Err(AppError::Core(CoreError::Conflict(format!(
            "Track {track_id} is already playing"
        )))),
        VoteOutcome::TrackNotFound => Err(AppError::Core(CoreError::track_not_found(track_id))),
    }
}
