//! Input validation for rooms, members, and tracks.
//!
//! Shared by the API handlers and the in-memory store so both reject the
//! same inputs with the same messages.

use crate::error::CoreError;

/// Maximum length of a room name, in characters.
pub const MAX_ROOM_NAME_LEN: usize = 100;

/// Maximum length of a member name, in characters.
pub const MAX_MEMBER_NAME_LEN: usize = 64;

/// Maximum length of a track title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of a track source (URL or provider id), in characters.
pub const MAX_SOURCE_LEN: usize = 2048;

/// Longest accepted track: 24 hours.
pub const MAX_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Validate a required, length-bounded text field.
///
/// Leading and trailing whitespace is ignored when checking for emptiness
/// and length.
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters, got {len}"
        )));
    }
    Ok(())
}

pub fn validate_room_name(name: &str) -> Result<(), CoreError> {
    validate_text("name", name, MAX_ROOM_NAME_LEN)
}

pub fn validate_member_name(name: &str) -> Result<(), CoreError> {
    validate_text("name", name, MAX_MEMBER_NAME_LEN)
}

/// Validate a voter identifier. Voters share the member-name rules.
pub fn validate_voter(voter: &str) -> Result<(), CoreError> {
    validate_text("voter", voter, MAX_MEMBER_NAME_LEN)
}

/// Validate the fields of a track submission.
pub fn validate_track(title: &str, source: &str, duration_ms: i64) -> Result<(), CoreError> {
    validate_text("title", title, MAX_TITLE_LEN)?;
    validate_text("source", source, MAX_SOURCE_LEN)?;
    if duration_ms <= 0 {
        return Err(CoreError::Validation(format!(
            "duration_ms must be positive, got {duration_ms}"
        )));
    }
    if duration_ms > MAX_DURATION_MS {
        return Err(CoreError::Validation(format!(
            "duration_ms must be at most {MAX_DURATION_MS}, got {duration_ms}"
        )));
    }
    Ok(())
}
