//! Event type for the printed schedule.
//!
//! An [`Event`] is a timed calendar entry that survived aggregation: all-day
//! entries never reach this type. Start and end keep the UTC offset the
//! calendar reported so the receipt shows the time the way the calendar
//! owner sees it.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A timed calendar event, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event title.
    pub title: String,
    /// When the event starts.
    pub start: DateTime<FixedOffset>,
    /// When the event ends.
    pub end: DateTime<FixedOffset>,
    /// Where the event takes place. Never an empty string.
    pub location: Option<String>,
    /// The calendar the event came from.
    pub calendar_id: String,
}

impl Event {
    /// Creates a new event without a location.
    pub fn new(
        title: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            location: None,
            calendar_id: calendar_id.into(),
        }
    }

    /// Sets the location. Blank locations are treated as absent.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    /// Returns the location, if any.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}
