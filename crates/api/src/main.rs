use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebox_api::config::{LogFormat, ServerConfig};
use jukebox_api::router::build_app_router;
use jukebox_api::state::AppState;
use jukebox_api::ws;
use jukebox_db::store::PgStore;
use jukebox_events::RoomHub;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukebox_api=debug,tower_http=debug".into()),
        )
        .with(pretty)
        .with(json)
        .init();

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = jukebox_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(max_connections = config.db_max_connections, "Database connection pool created");

    jukebox_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    jukebox_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- App state ---
    let store = Arc::new(PgStore::new(pool));
    let hub = Arc::new(RoomHub::default());
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let state = AppState::new(config.clone(), store, Arc::clone(&hub));
    let ws_manager = Arc::clone(&state.ws_manager);

    // --- Heartbeat ---
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    heartbeat_cancel.cancel();
    if tokio::time::timeout(shutdown_timeout, heartbeat_handle)
        .await
        .is_err()
    {
        tracing::warn!("Heartbeat task did not stop in time");
    }
    tracing::info!("Heartbeat task stopped");

    let ws_count = ws_manager.connection_count().await;
    let rooms = hub.room_count().await;
    tracing::info!(ws_count, rooms, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
