//! Google Calendar API client.
//!
//! A thin wrapper over `events.list`: builds the query, follows page tokens
//! and converts each item into a [`RawEvent`] that keeps the UTC offset
//! Google sent.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use dayprint_core::TimeWindow;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawEventTime};

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Lists the timed and all-day events of one calendar inside `window`,
    /// expanded into single instances and ordered by start time.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: TimeWindow,
    ) -> ProviderResult<Vec<RawEvent>> {
        let mut all_events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_events_page(access_token, calendar_id, window, page_token.as_deref())
                .await?;

            for item in page.items {
                if let Some(raw) = convert_event(item, calendar_id)? {
                    all_events.push(raw);
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("fetched {} events from calendar {}", all_events.len(), calendar_id);
        Ok(all_events)
    }

    async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: TimeWindow,
        page_token: Option<&str>,
    ) -> ProviderResult<EventListResponse> {
        let url = self.events_url(calendar_id);
        let (time_min, time_max) = window.rfc3339_bounds();

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            ProviderError::network(message).with_source(e)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse events response: {}", e))
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        )
    }
}

/// Converts one API item. Cancelled instances are skipped; an item without
/// a usable start or end makes the whole response invalid.
fn convert_event(event: ApiEvent, calendar_id: &str) -> ProviderResult<Option<RawEvent>> {
    if event.status.as_deref() == Some("cancelled") {
        return Ok(None);
    }

    let id = event.id.unwrap_or_default();
    let start = convert_time(&event.start, &id, "start")?;
    let end = convert_time(&event.end, &id, "end")?;

    let mut raw = RawEvent::new(id, start, end, calendar_id);
    raw.summary = event.summary;
    raw.location = event.location;
    raw.status = event.status;
    Ok(Some(raw))
}

fn convert_time(time: &ApiEventTime, id: &str, which: &str) -> ProviderResult<RawEventTime> {
    let invalid = |detail: String| {
        ProviderError::invalid_response(format!("event {}: {} {}", id, which, detail))
    };

    match (&time.date_time, &time.date) {
        (Some(dt), _) => DateTime::parse_from_rfc3339(dt)
            .map(RawEventTime::DateTime)
            .map_err(|e| invalid(format!("dateTime {:?}: {}", dt, e))),
        (None, Some(date)) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(RawEventTime::Date)
            .map_err(|e| invalid(format!("date {:?}: {}", date, e))),
        (None, None) => Err(invalid("has neither dateTime nor date".to_string())),
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    #[serde(default)]
    end: ApiEventTime,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}
