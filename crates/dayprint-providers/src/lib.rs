//! Calendar and weather providers for dayprint.
//!
//! - [`CalendarProvider`] - the trait calendar backends implement
//! - [`RawEvent`] - provider-level event data before aggregation
//! - [`aggregate_events`] - filters and orders raw events into printable [`dayprint_core::Event`]s
//! - [`WeatherProvider`] - the trait weather backends implement
//! - [`ProviderError`] - error type shared by both kinds of provider
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐             ┌─────────────────────┐
//! │  Google API     │             │ Weather Underground │
//! └────────┬────────┘             └──────────┬──────────┘
//!          ▼                                 ▼
//! ┌─────────────────┐             ┌─────────────────────┐
//! │ GoogleProvider  │             │ WundergroundClient  │
//! └────────┬────────┘             └──────────┬──────────┘
//!          │ CalendarProvider                │ WeatherProvider
//!          ▼                                 ▼
//!   Vec<RawEvent> ── aggregate_events ──▶ Vec<Event>    WeatherReport
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod normalize;
pub mod provider;
pub mod raw_event;
#[cfg(feature = "wunderground")]
pub mod weather;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{aggregate_events, to_event};
pub use provider::{BoxFuture, CalendarProvider, FetchOptions, FetchResult, fetch_todays_events};
pub use raw_event::{RawEvent, RawEventTime};
#[cfg(feature = "wunderground")]
pub use weather::WeatherProvider;
