use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jukebox_core::error::CoreError;
use jukebox_db::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jukebox_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure reported by the track or room store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Store errors ---
            AppError::Store(StoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Store(StoreError::Unavailable(err)) => {
                // Details are logged, never returned.
                tracing::error!(error = %err, "Store unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

