//! Timestamp type and parsing of upstream timestamp strings.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, Result};

/// Timestamp type
pub type Time = DateTime<Utc>;

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339 (any offset, normalized to UTC) or integer Unix epoch
/// milliseconds.
pub fn parse_timestamp(raw: &str) -> Result<Time> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(millis) = trimmed.parse::<i64>() {
        if let Some(parsed) = DateTime::<Utc>::from_timestamp_millis(millis) {
            return Ok(parsed);
        }
    }

    Err(CoreError::InvalidInput(format!("invalid timestamp: {raw:?}")))
}
