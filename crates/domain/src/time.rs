//! Time and timestamp helpers.
//!
//! Every timing rule in the domain (stability, cooldown, history window) is
//! expressed in milliseconds since the Unix epoch so the pure functions can be
//! driven with synthetic clocks in tests.

use chrono::{DateTime, Utc};

/// UTC timestamp used for human-readable fields such as `timestamp`.
pub type Timestamp = DateTime<Utc>;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Return the current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> Millis {
    Utc::now().timestamp_millis()
}

/// Convert epoch milliseconds to a [`Timestamp`], clamping invalid values to the epoch.
#[must_use]
pub fn from_ms(ms: Millis) -> Timestamp {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}
