//! RawEvent to Event aggregation.
//!
//! Calendars are fetched one at a time and their results concatenated; this
//! module turns that concatenation into the list printed under "Today's
//! Schedule":
//! 1. Drops cancelled events and events without a start datetime (all-day)
//! 2. Maps each remaining [`RawEvent`] to an [`Event`]
//! 3. Stable-sorts by start instant, so ties keep calendar order

use dayprint_core::Event;

use crate::raw_event::{RawEvent, RawEventTime};

/// Converts a timed [`RawEvent`] to an [`Event`].
///
/// Returns `None` for all-day events. An all-day end paired with a timed
/// start collapses to the start instant.
pub fn to_event(raw: &RawEvent) -> Option<Event> {
    let start = raw.start.as_datetime()?;
    let end = match raw.end {
        RawEventTime::DateTime(end) => end,
        RawEventTime::Date(_) => start,
    };

    let mut event = Event::new(raw.effective_title(), start, end, &raw.calendar_id);
    if let Some(ref location) = raw.location {
        event = event.with_location(location);
    }
    Some(event)
}

/// Filters, maps and orders the concatenated per-calendar results.
pub fn aggregate_events(raw_events: &[RawEvent]) -> Vec<Event> {
    let mut events: Vec<Event> = raw_events
        .iter()
        .filter(|e| !e.is_cancelled())
        .filter_map(to_event)
        .collect();

    // sort_by_key is stable
    events.sort_by_key(|e| e.start.to_utc());
    events
}
