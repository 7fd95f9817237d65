//! Query windows for calendar lookups.
//!
//! The printed day is not bounded by true local midnight. It starts at a
//! fixed UTC hour on the local date and runs for 24 hours, which is what the
//! calendar query sends as `timeMin`/`timeMax`.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default UTC hour at which the printed day begins (US Central midnight
/// during daylight saving time).
pub const DEFAULT_DAY_START_UTC_HOUR: u32 = 5;

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates the one-day window `[date T hour:00Z, date+1 T hour:00Z)`.
    ///
    /// Returns `None` if `hour` is not a valid hour of day or the date has no
    /// successor.
    pub fn for_date_at_utc_hour(date: NaiveDate, hour: u32) -> Option<Self> {
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        let next = date.succ_opt()?;
        Some(Self {
            start: date.and_time(time).and_utc(),
            end: next.and_time(time).and_utc(),
        })
    }

    /// Returns the bounds formatted as RFC 3339 UTC timestamps with a `Z`
    /// suffix, as the calendar API expects them.
    pub fn rfc3339_bounds(&self) -> (String, String) {
        (
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}
