//! Click entity representing a single resolved redirect.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::Serialize;

/// Width of the time slots event counts are grouped into.
///
/// Every real-world UTC offset is a multiple of 15 minutes, so a slot never
/// straddles a local midnight.
pub const CLICK_SLOT_SECONDS: i64 = 900;

/// An immutable analytics record written once per successful redirect.
///
/// `referrer` and `user_agent` hold the raw header values as received, which
/// may be empty or malformed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl Click {
    /// Creates a new Click instance.
    pub fn new(
        id: i64,
        link_id: i64,
        occurred_at: DateTime<Utc>,
        referrer: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id,
            link_id,
            occurred_at,
            referrer,
            user_agent,
        }
    }
}

/// Input data for recording a click. The store assigns `id` and `occurred_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: i64,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

/// Number of events whose timestamp falls in the slot starting at `slot_start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCount {
    pub slot_start: DateTime<Utc>,
    pub clicks: i64,
}

/// Number of events sharing one raw referrer and user-agent pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub clicks: i64,
}

/// Start of the [`CLICK_SLOT_SECONDS`] slot containing `at`.
pub fn slot_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::seconds(CLICK_SLOT_SECONDS))
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slot_start_truncates_to_quarter_hour() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 44, 59).unwrap();
        assert_eq!(slot_start(at), Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap());

        let boundary = Utc.with_ymd_and_hms(2024, 6, 1, 10, 45, 0).unwrap();
        assert_eq!(slot_start(boundary), boundary);
    }

    #[test]
    fn test_click_creation_with_all_fields() {
        let now = Utc::now();
        let click = Click::new(
            1,
            42,
            now,
            Some("https://google.com".to_string()),
            Some("Mozilla/5.0".to_string()),
        );

        assert_eq!(click.id, 1);
        assert_eq!(click.link_id, 42);
        assert_eq!(click.occurred_at, now);
        assert_eq!(click.referrer.as_deref(), Some("https://google.com"));
        assert_eq!(click.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_click_creation_minimal() {
        let click = Click::new(1, 10, Utc::now(), None, None);

        assert_eq!(click.link_id, 10);
        assert!(click.referrer.is_none());
        assert!(click.user_agent.is_none());
    }
}
