//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

use crate::config::MAX_SESSION_TTL_HOURS;

/// Timestamp `hours` from now, used for session expiry
///
/// `hours` is clamped to +/- `MAX_SESSION_TTL_HOURS`.
pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    let hours = hours.clamp(-MAX_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS);
    Utc::now() + Duration::hours(hours)
}
