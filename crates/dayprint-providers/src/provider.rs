//! CalendarProvider trait definition.
//!
//! This module defines the [`CalendarProvider`] trait, the seam between the
//! print pipeline and a calendar backend, plus [`fetch_todays_events`], which
//! runs one fetch and aggregates the result.

use std::future::Future;
use std::pin::Pin;

use dayprint_core::{Event, TimeWindow};
use tracing::debug;

use crate::error::ProviderResult;
use crate::normalize::aggregate_events;
use crate::raw_event::RawEvent;

/// Result from fetching events.
#[derive(Debug, Default)]
pub struct FetchResult {
    /// Events in calendar order, each calendar's page order preserved.
    pub events: Vec<RawEvent>,
}

impl FetchResult {
    pub fn with_events(events: Vec<RawEvent>) -> Self {
        Self { events }
    }
}

/// Options for fetching events.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Time window to fetch events for.
    pub time_window: TimeWindow,
    /// Calendars to query, in order.
    pub calendar_ids: Vec<String>,
}

impl FetchOptions {
    pub fn new(time_window: TimeWindow) -> Self {
        Self {
            time_window,
            calendar_ids: Vec::new(),
        }
    }

    /// Builder method to set the calendars to query.
    pub fn with_calendar_ids(mut self, ids: Vec<String>) -> Self {
        self.calendar_ids = ids;
        self
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the print command can hold a
/// `&dyn CalendarProvider`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core abstraction for calendar providers.
///
/// Implementations query every calendar in [`FetchOptions::calendar_ids`]
/// in order, follow pagination internally, and fail the whole fetch if any
/// single calendar fails.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name/type of this provider (e.g., "google").
    fn name(&self) -> &str;

    /// Fetches raw events for the requested calendars.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, authentication failures, etc.
    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<FetchResult>>;

    /// Checks if the provider currently holds a usable credential.
    fn is_authenticated(&self) -> bool;
}

/// Fetches the events for one printed day and returns them aggregated:
/// timed events only, ordered by start.
pub async fn fetch_todays_events(
    provider: &dyn CalendarProvider,
    calendar_ids: &[String],
    window: TimeWindow,
) -> ProviderResult<Vec<Event>> {
    let options = FetchOptions::new(window).with_calendar_ids(calendar_ids.to_vec());
    let result = provider.fetch_events(options).await?;
    debug!(
        provider = provider.name(),
        raw = result.events.len(),
        "fetched calendar events"
    );
    Ok(aggregate_events(&result.events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_event::RawEventTime;
    use chrono::{DateTime, NaiveDate};
    use std::sync::Mutex;

    /// Serves canned events per calendar id and records the options it saw.
    struct CannedProvider {
        events: Vec<RawEvent>,
        seen: Mutex<Vec<FetchOptions>>,
    }

    impl CalendarProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        fn fetch_events(
            &self,
            options: FetchOptions,
        ) -> BoxFuture<'_, ProviderResult<FetchResult>> {
            let events = options
                .calendar_ids
                .iter()
                .flat_map(|id| self.events.iter().filter(move |e| &e.calendar_id == id))
                .cloned()
                .collect();
            self.seen.lock().unwrap().push(options);
            Box::pin(async move { Ok(FetchResult::with_events(events)) })
        }

        fn is_authenticated(&self) -> bool {
            true
        }
    }

    fn window() -> TimeWindow {
        TimeWindow::for_date_at_utc_hour(NaiveDate::from_ymd_opt(2025, 2, 5).unwrap(), 5).unwrap()
    }

    fn timed(id: &str, start: &str, calendar: &str) -> RawEvent {
        let dt = DateTime::parse_from_rfc3339(start).unwrap();
        RawEvent::new(id, RawEventTime::DateTime(dt), RawEventTime::DateTime(dt), calendar)
            .with_summary(id)
    }

    #[tokio::test]
    async fn fetch_todays_events_aggregates() {
        let provider = CannedProvider {
            events: vec![
                timed("b-late", "2025-02-05T15:00:00Z", "b"),
                timed("a-late", "2025-02-05T16:00:00Z", "a"),
                timed("a-early", "2025-02-05T10:00:00Z", "a"),
                RawEvent::new(
                    "holiday",
                    RawEventTime::Date(NaiveDate::from_ymd_opt(2025, 2, 5).unwrap()),
                    RawEventTime::Date(NaiveDate::from_ymd_opt(2025, 2, 6).unwrap()),
                    "b",
                ),
            ],
            seen: Mutex::new(Vec::new()),
        };
        let ids = vec!["a".to_string(), "b".to_string()];

        let events = fetch_todays_events(&provider, &ids, window()).await.unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a-early", "b-late", "a-late"]);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].calendar_ids, ids);
        assert_eq!(seen[0].time_window, window());
    }
}
