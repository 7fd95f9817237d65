//! Weather snapshot printed under "Today's Weather".

use serde::{Deserialize, Serialize};

/// The four text forecast periods printed on the receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub today: String,
    pub tonight: String,
    pub tomorrow: String,
    pub tomorrow_night: String,
}

/// Current conditions and the short-range forecast for one location.
///
/// Built once from a provider response and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// City the observation is for.
    pub city: String,
    /// State or region of the city.
    pub state: String,
    /// Current temperature in degrees Fahrenheit, printed exactly as the
    /// provider reported it (`"70.0"` stays `70.0`).
    pub temp_f: String,
    /// Apparent ("feels like") temperature, as reported.
    pub feels_like_f: String,
    /// Short description of current conditions (e.g. "Partly Cloudy").
    pub condition: String,
    /// Precipitation so far today in inches, when the station reports it.
    pub precip_today_in: Option<f64>,
    /// Icon for the current conditions, as reported by the provider.
    pub icon_url: Option<String>,
    /// Text forecasts.
    pub forecast: Forecast,
}

impl WeatherReport {
    /// Returns "City, ST".
    pub fn place(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_joins_city_and_state() {
        let report = WeatherReport {
            city: "Irving".to_string(),
            state: "TX".to_string(),
            temp_f: "71.5".to_string(),
            feels_like_f: "72".to_string(),
            condition: "Clear".to_string(),
            precip_today_in: Some(0.0),
            icon_url: None,
            forecast: Forecast::default(),
        };
        assert_eq!(report.place(), "Irving, TX");
    }
}
