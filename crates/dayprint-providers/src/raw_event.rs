//! Raw event type from calendar providers.
//!
//! [`RawEvent`] is the provider-level shape of a calendar entry before
//! aggregation turns it into a printable [`dayprint_core::Event`].

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Title used when an event has no summary.
pub const UNTITLED: &str = "(No title)";

/// The start or end of a raw event.
///
/// Timed events carry an RFC 3339 datetime whose offset is kept as sent;
/// all-day events carry a bare date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawEventTime {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl RawEventTime {
    /// Returns true if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Returns the datetime, if this is a timed value.
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Date(_) => None,
        }
    }
}

/// A raw calendar event from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Unique identifier for the event within the provider.
    pub id: String,
    pub start: RawEventTime,
    pub end: RawEventTime,
    pub summary: Option<String>,
    pub location: Option<String>,
    /// The calendar this event was fetched from.
    pub calendar_id: String,
    /// The event status (e.g. "confirmed", "tentative", "cancelled").
    pub status: Option<String>,
}

impl RawEvent {
    /// Creates a new raw event with the minimum required fields.
    pub fn new(
        id: impl Into<String>,
        start: RawEventTime,
        end: RawEventTime,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            summary: None,
            location: None,
            calendar_id: calendar_id.into(),
            status: None,
        }
    }

    /// Returns the effective title, falling back to "(No title)" if empty.
    pub fn effective_title(&self) -> &str {
        self.summary
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .unwrap_or(UNTITLED)
    }

    /// Returns true if the event is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.eq_ignore_ascii_case("cancelled"))
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(s: &str) -> RawEventTime {
        RawEventTime::DateTime(DateTime::parse_from_rfc3339(s).unwrap())
    }

    fn all_day() -> RawEventTime {
        RawEventTime::Date(NaiveDate::from_ymd_opt(2025, 2, 5).unwrap())
    }

    #[test]
    fn time_variants() {
        let dt = timed("2025-02-05T10:00:00-06:00");
        assert!(!dt.is_all_day());
        assert_eq!(
            dt.as_datetime().unwrap().offset().local_minus_utc(),
            -6 * 3600
        );
        assert!(all_day().is_all_day());
        assert!(all_day().as_datetime().is_none());
    }

    #[test]
    fn untitled_fallback() {
        let event = RawEvent::new(
            "evt-1",
            timed("2025-02-05T10:00:00Z"),
            timed("2025-02-05T11:00:00Z"),
            "primary",
        );
        assert_eq!(event.effective_title(), "(No title)");
        assert_eq!(event.clone().with_summary("   ").effective_title(), "(No title)");
        assert_eq!(event.with_summary("Lecture").effective_title(), "Lecture");
    }

    #[test]
    fn cancelled_is_case_insensitive() {
        let event = RawEvent::new("evt-1", all_day(), all_day(), "primary").with_status("Cancelled");
        assert!(event.is_cancelled());
        assert!(event.is_all_day());
    }
}
