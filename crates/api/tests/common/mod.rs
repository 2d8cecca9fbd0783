#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jukebox_api::config::{LogFormat, ServerConfig};
use jukebox_api::router::build_app_router;
use jukebox_api::state::AppState;
use jukebox_db::store::MemoryStore;
use jukebox_events::RoomHub;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        log_format: LogFormat::Pretty,
        db_max_connections: 1,
    }
}

/// The application under test plus handles on its backing store and hub.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub hub: Arc<RoomHub>,
}

impl TestApp {
    /// A fresh router clone for one request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an in-memory store.
///
/// Goes through `build_app_router`, so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) that
/// production uses.
pub fn build_test_app() -> TestApp {
    build_test_app_with_hub(Arc::new(RoomHub::default()))
}

/// Same as [`build_test_app`] but broadcasting through the given hub.
pub fn build_test_app_with_hub(hub: Arc<RoomHub>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(test_config(), Arc::clone(&store), Arc::clone(&hub));

    TestApp {
        router: build_app_router(state),
        store,
        hub,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty(), false).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(body.to_string()), true).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, Body::empty(), false).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty(), false).await
}

async fn send(app: Router, method: Method, uri: &str, body: Body, json: bool) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if json {
        builder = builder.header("content-type", "application/json");
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a room through the API and return its id.
pub async fn create_room(app: &TestApp, name: &str) -> i64 {
    let response = post_json(app.app(), "/api/v1/rooms", serde_json::json!({ "name": name })).await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Queue a track through the API and return its id.
pub async fn create_track(app: &TestApp, room_id: i64, title: &str, duration_ms: i64) -> i64 {
    let response = post_json(
        app.app(),
        &format!("/api/v1/rooms/{room_id}/tracks"),
        serde_json::json!({
            "title": title,
            "source": format!("https://example.com/{title}"),
            "duration_ms": duration_ms,
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
