//! Route definitions for rooms and everything scoped to a room.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{member, queue, room, track};
use crate::state::AppState;
use crate::ws;

/// Routes mounted at `/rooms`.
///
/// ```text
/// GET    /                                      -> room::list
/// POST   /                                      -> room::create
/// GET    /{room_id}                             -> room::get_by_id
/// DELETE /{room_id}                             -> room::delete
///
/// GET    /{room_id}/tracks                      -> track::list_queue
/// POST   /{room_id}/tracks                      -> track::create
/// DELETE /{room_id}/tracks/{track_id}           -> track::delete
/// POST   /{room_id}/tracks/{track_id}/vote      -> track::vote
///
/// GET    /{room_id}/current                     -> queue::current
/// POST   /{room_id}/advance                     -> queue::advance
///
/// GET    /{room_id}/members                     -> member::list_by_room
/// POST   /{room_id}/members                     -> member::join
/// DELETE /{room_id}/members/{member_id}         -> member::leave
///
/// GET    /{room_id}/ws                          -> WebSocket subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(room::list).post(room::create))
        .route("/{room_id}", get(room::get_by_id).delete(room::delete))
        .route(
            "/{room_id}/tracks",
            get(track::list_queue).post(track::create),
        )
        .route("/{room_id}/tracks/{track_id}", delete(track::delete))
        .route("/{room_id}/tracks/{track_id}/vote", post(track::vote))
        .route("/{room_id}/current", get(queue::current))
        .route("/{room_id}/advance", post(queue::advance))
        .route(
            "/{room_id}/members",
            get(member::list_by_room).post(member::join),
        )
        .route("/{room_id}/members/{member_id}", delete(member::leave))
        .route("/{room_id}/ws", get(ws::ws_handler))
}
