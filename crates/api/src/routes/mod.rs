pub mod health;
pub mod room;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rooms                                          list, create
/// /rooms/{room_id}                                get, delete
/// /rooms/{room_id}/tracks                         queue (ordered), add track
/// /rooms/{room_id}/tracks/{track_id}              remove track
/// /rooms/{room_id}/tracks/{track_id}/vote         up/down vote
/// /rooms/{room_id}/current                        current-or-next track
/// /rooms/{room_id}/advance                        skip to next track
/// /rooms/{room_id}/members                        list, join
/// /rooms/{room_id}/members/{member_id}            leave
/// /rooms/{room_id}/ws                             WebSocket room events
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/rooms", room::router())
}
