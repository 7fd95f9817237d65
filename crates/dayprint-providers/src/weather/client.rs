//! Weather Underground client.

use std::time::Duration;

use dayprint_core::{Forecast, WeatherReport};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::BoxFuture;

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://api.wunderground.com/api";

const PROVIDER_NAME: &str = "wunderground";

/// Where and how to query Weather Underground.
#[derive(Debug, Clone)]
pub struct WundergroundConfig {
    pub api_key: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl WundergroundConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(
        api_key: impl Into<String>,
        country: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            country: country.into(),
            state: state.into(),
            city: city.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("api_key", &self.api_key),
            ("country", &self.country),
            ("state", &self.state),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(format!("weather.{} is required", field));
            }
        }
        Ok(())
    }

    /// `{base}/{key}/geolookup/forecast/conditions/q/{country}/{state}/{city}.json`
    pub fn request_url(&self) -> String {
        format!(
            "{}/{}/geolookup/forecast/conditions/q/{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.country),
            urlencoding::encode(&self.state),
            urlencoding::encode(&self.city),
        )
    }
}

/// Weather Underground client.
#[derive(Debug)]
pub struct WundergroundClient {
    config: WundergroundConfig,
    http_client: reqwest::Client,
}

impl WundergroundClient {
    pub fn new(config: WundergroundConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn fetch_report(&self) -> ProviderResult<WeatherReport> {
        let url = self.config.request_url();
        debug!(
            city = %self.config.city,
            state = %self.config.state,
            "fetching weather"
        );

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else {
                // reqwest includes the URL, which carries the API key.
                format!("request failed: {}", e.without_url())
            };
            ProviderError::network(message)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::server(format!(
                "weather service returned {}",
                status
            )));
        }

        parse_conditions(&body)
    }
}

impl WeatherProvider for WundergroundClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch(&self) -> BoxFuture<'_, ProviderResult<WeatherReport>> {
        Box::pin(async move {
            self.fetch_report()
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }
}

/// Parses a geolookup/forecast/conditions response body.
///
/// A `response.error` object is reported before anything else is looked
/// at; an unknown API key maps to `AuthenticationFailed`.
pub fn parse_conditions(body: &str) -> ProviderResult<WeatherReport> {
    let parsed: ConditionsResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse weather response: {}", e))
    })?;

    if let Some(error) = parsed.response.and_then(|r| r.error) {
        let message = format!(
            "weather service error {}: {}",
            error.kind,
            error.description.unwrap_or_default()
        );
        return Err(if error.kind == "keynotfound" {
            ProviderError::authentication(message)
        } else {
            ProviderError::invalid_response(message)
        });
    }

    let location = parsed.location.ok_or_else(|| missing("location"))?;
    let observation = parsed
        .current_observation
        .ok_or_else(|| missing("current_observation"))?;
    let days = parsed
        .forecast
        .ok_or_else(|| missing("forecast"))?
        .txt_forecast
        .forecastday;

    let text = |index: usize| -> ProviderResult<String> {
        days.get(index)
            .map(|d| d.fcttext.clone())
            .ok_or_else(|| missing(&format!("forecast.txt_forecast.forecastday[{}]", index)))
    };
    let today = text(0)?;
    let tonight = text(1)?;
    let tomorrow = text(2)?;
    // Some stations only send three periods; tomorrow night then repeats
    // the first one.
    let tomorrow_night = match days.get(3) {
        Some(day) => day.fcttext.clone(),
        None => {
            debug!("forecast has no fourth period, using the first");
            today.clone()
        }
    };

    Ok(WeatherReport {
        city: location.city,
        state: location.state,
        temp_f: required_reading(observation.temp_f, "current_observation.temp_f")?,
        feels_like_f: required_reading(
            observation.feelslike_f,
            "current_observation.feelslike_f",
        )?,
        condition: observation.weather,
        precip_today_in: observation.precip_today_in.and_then(|n| n.value()),
        icon_url: observation.icon_url.filter(|u| !u.is_empty()),
        forecast: Forecast {
            today,
            tonight,
            tomorrow,
            tomorrow_night,
        },
    })
}

fn missing(field: &str) -> ProviderError {
    ProviderError::invalid_response(format!("weather response is missing {}", field))
}

/// Keeps the reading as the service wrote it, once it is known to be numeric.
fn required_reading(value: Option<Number>, field: &str) -> ProviderResult<String> {
    value.and_then(|n| n.reported()).ok_or_else(|| missing(field))
}

#[derive(Debug, Deserialize)]
struct ConditionsResponse {
    response: Option<ResponseMeta>,
    location: Option<ApiLocation>,
    current_observation: Option<ApiObservation>,
    forecast: Option<ApiForecast>,
}

#[derive(Debug, Deserialize)]
struct ResponseMeta {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    city: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ApiObservation {
    temp_f: Option<Number>,
    feelslike_f: Option<Number>,
    weather: String,
    precip_today_in: Option<Number>,
    icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    txt_forecast: TxtForecast,
}

#[derive(Debug, Deserialize)]
struct TxtForecast {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    fcttext: String,
}

/// The service sends some numbers as JSON numbers and others as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Number {
    Json(serde_json::Number),
    Text(String),
}

impl Number {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Json(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// `70.0` stays `70.0`, `70` stays `70`, `"58"` stays `58`.
    fn reported(&self) -> Option<String> {
        self.value()?;
        match self {
            Self::Json(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.trim().to_string()),
        }
    }
}
