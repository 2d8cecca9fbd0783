/// Row id of a room, track or member (`BIGSERIAL`).
pub type DbId = i64;

/// Instants such as `created_at` and `played_at`, always in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
