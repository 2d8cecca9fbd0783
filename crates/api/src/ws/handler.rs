use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use jukebox_core::error::CoreError;
use jukebox_core::room_events::EVENT_REFRESH_TRACKS;
use jukebox_core::types::DbId;
use jukebox_events::{RoomEvent, RoomHub};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to a room-scoped WebSocket.
///
/// Unknown rooms are rejected with 404 before the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<Response> {
    if state.rooms.find_room(room_id).await?.is_none() {
        return Err(CoreError::room_not_found(room_id).into());
    }

    let ws_manager = state.ws_manager.clone();
    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, room_id, ws_manager, hub)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` and subscribes to the room.
///   2. Spawns a sender task that forwards control frames and room events.
///   3. Processes inbound messages on the current task.
///   4. Stops the sender and unsubscribes on disconnect.
async fn handle_socket(
    socket: WebSocket,
    room_id: DbId,
    ws_manager: Arc<WsManager>,
    hub: Arc<RoomHub>,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();

    let mut rx = ws_manager.add(conn_id.clone(), room_id).await;
    let mut events = hub.subscribe(room_id).await;
    let room_connections = ws_manager.room_connection_count(room_id).await;
    tracing::info!(conn_id = %conn_id, room_id, room_connections, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // The sender task hands the subscription back so it can be released.
    let stop = CancellationToken::new();
    let sender_stop = stop.clone();
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                () = sender_stop.cancelled() => break,
                control = rx.recv() => match control {
                    Some(msg) => msg,
                    None => break,
                },
                event = events.recv() => match event {
                    Ok(event) => match event_frame(&event) {
                        Some(frame) => frame,
                        None => continue,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(conn_id = %sender_conn_id, skipped, "WebSocket subscriber lagged");
                        // Missed events collapse into a single refresh.
                        match event_frame(&RoomEvent::new(room_id, EVENT_REFRESH_TRACKS)) {
                            Some(frame) => frame,
                            None => continue,
                        }
                    }
                    Err(RecvError::Closed) => Message::Close(None),
                },
            };

            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
        events
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {
                // Clients only listen; inbound data frames are ignored.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    stop.cancel();
    match send_task.await {
        Ok(events) => hub.unsubscribe(room_id, events).await,
        Err(e) => tracing::warn!(conn_id = %conn_id, error = %e, "WebSocket sender task failed"),
    }
    tracing::info!(conn_id = %conn_id, room_id, "WebSocket disconnected");
}

/// Serialize a room event as a JSON text frame.
fn event_frame(event: &RoomEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::error!(error = %e, event = %event.event, "Failed to serialize room event");
            None
        }
    }
}
