//! Timestamp utilities

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Timestamp `ttl` after `from`
///
/// Saturates at `DateTime::<Utc>::MAX_UTC` instead of overflowing for absurd TTLs.
pub fn expiry_after(from: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(ttl)
        .ok()
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Convert a server-side "expires in N seconds" value into an absolute timestamp
///
/// Negative values are treated as already expired.
pub fn expiry_from_secs(from: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    expiry_after(from, Duration::from_secs(seconds.max(0) as u64))
}
