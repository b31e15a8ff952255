//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for read-time stamps such as `Alert::observed_at`.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
