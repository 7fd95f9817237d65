//! Weather providers.
//!
//! [`WeatherProvider`] is the seam the print command fetches through; the
//! only implementation is [`WundergroundClient`], which issues a single
//! geolookup/forecast/conditions request per run.

mod client;

pub use client::{DEFAULT_BASE_URL, WundergroundClient, WundergroundConfig, parse_conditions};

use dayprint_core::WeatherReport;

use crate::error::ProviderResult;
use crate::provider::BoxFuture;

/// A source of current conditions and a short text forecast.
pub trait WeatherProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "wunderground").
    fn name(&self) -> &str;

    /// Fetches one weather snapshot.
    ///
    /// # Errors
    ///
    /// `NetworkError` when the service is unreachable, `InvalidResponse`
    /// when the body is malformed or incomplete.
    fn fetch(&self) -> BoxFuture<'_, ProviderResult<WeatherReport>>;
}
