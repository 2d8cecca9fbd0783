use std::sync::Arc;

use jukebox_db::store::{RoomStore, TrackStore};
use jukebox_events::{RoomHub, RoomNotifier};

use crate::config::ServerConfig;
use crate::engine::QueueAdvancer;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Track persistence.
    pub tracks: Arc<dyn TrackStore>,
    /// Room and member persistence.
    pub rooms: Arc<dyn RoomStore>,
    /// Broadcast seam used by handlers to signal room listeners.
    pub notifier: Arc<dyn RoomNotifier>,
    /// Per-room subscription hub (WebSocket clients subscribe here).
    pub hub: Arc<RoomHub>,
    /// Current-track selection and advancement.
    pub advancer: Arc<QueueAdvancer>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
}

impl AppState {
    /// Wire the state around one store that serves both tracks and rooms,
    /// with `hub` as the room notifier.
    pub fn new<S>(config: ServerConfig, store: Arc<S>, hub: Arc<RoomHub>) -> Self
    where
        S: TrackStore + RoomStore + 'static,
    {
        let tracks: Arc<dyn TrackStore> = store.clone();
        let rooms: Arc<dyn RoomStore> = store;
        let notifier: Arc<dyn RoomNotifier> = hub.clone();
        let advancer = Arc::new(QueueAdvancer::new(tracks.clone(), notifier.clone()));

        Self {
            config: Arc::new(config),
            tracks,
            rooms,
            notifier,
            hub,
            advancer,
            ws_manager: Arc::new(WsManager::new()),
        }
    }
}
