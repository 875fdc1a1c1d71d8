//! Server-side session lifetime rules.
//!
//! A session is live while `now < end_time`. Every authenticated request
//! pushes `end_time` to `now + window`, independent of the signed token's own
//! `exp` claim.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Default sliding session window in minutes.
pub const DEFAULT_SESSION_WINDOW_MINS: i64 = 60;

/// Client device details recorded with each session and echoed in the
/// signed token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(default)]
    pub platform: String,
    pub model_name: Option<String>,
    pub os_version: Option<String>,
    pub device_id: Option<String>,
}

/// Whether a session ending at `end_time` is still usable at `now`.
pub fn is_live(end_time: Timestamp, now: Timestamp) -> bool {
    now < end_time
}

/// The end time a session gets when created or touched at `now`.
pub fn extended_end_time(now: Timestamp, window_mins: i64) -> Timestamp {
    now + Duration::minutes(window_mins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn future_end_time_is_live() {
        let now = Utc::now();
        assert!(is_live(now + Duration::seconds(1), now));
    }

    #[test]
    fn end_time_equal_to_now_is_expired() {
        let now = Utc::now();
        assert!(!is_live(now, now));
        assert!(!is_live(now - Duration::minutes(5), now));
    }

    #[test]
    fn extension_is_measured_from_now() {
        let now = Utc::now();
        let end = extended_end_time(now, DEFAULT_SESSION_WINDOW_MINS);
        assert_eq!(end - now, Duration::hours(1));
    }
}
