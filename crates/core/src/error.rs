use crate::types::DbId;

/// Domain errors raised by validation and by handlers interpreting store
/// results.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A room, track or member that the request names does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Input rejected before reaching the store.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request collides with current state, e.g. a repeat vote.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    pub fn room_not_found(id: DbId) -> Self {
        CoreError::NotFound { entity: "Room", id }
    }

    pub fn track_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Track",
            id,
        }
    }
}
