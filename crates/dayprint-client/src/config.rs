//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/dayprint/config.toml` by default.
//!
//! Secret values (`google.client_id`, `google.client_secret`,
//! `weather.api_key`) support secret references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dayprint_core::receipt::{DEFAULT_NO_EVENTS_TEXT, DEFAULT_WIDTH};
use dayprint_core::time::DEFAULT_DAY_START_UTC_HOUR;
use dayprint_core::RenderOptions;
use dayprint_printer::serial::{DEFAULT_BAUD_RATE, DEFAULT_DEVICE};
use dayprint_printer::{SUPPORTED_BAUD_RATES, SerialSettings};
use dayprint_providers::google::{GoogleConfig, OAuthCredentials};
use dayprint_providers::weather::{DEFAULT_BASE_URL, WundergroundConfig};

use crate::error::{ClientError, ClientResult};

/// Configuration for a `dayprint` run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub google: GoogleSettings,
    pub weather: WeatherSettings,
    pub printer: PrinterSettings,
    pub display: DisplaySettings,
    pub print: PrintSettings,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dayprint")
    }

    /// Checks every section without touching the network or the printer.
    /// Secret references are resolved.
    pub fn validate(&self) -> ClientResult<()> {
        self.google.to_provider_config()?;
        self.google.day_start_hour()?;
        self.weather.to_provider_config()?;
        self.printer.validate()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// [google]
// ---------------------------------------------------------------------------

/// One `[[google.calendars]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Calendar id as shown in the calendar's settings (or `primary`).
    pub id: String,
    /// Name shown by `dayprint config validate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CalendarEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Google Calendar settings.
///
/// Credentials come either inline (`client_id` + `client_secret`, which
/// support secret references) or from a Cloud Console JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Cloud Console OAuth client JSON, used when no inline credentials are set.
    pub credentials_file: Option<PathBuf>,
    /// Where the OAuth token is stored.
    pub token_path: Option<PathBuf>,
    /// UTC hour at which the printed day starts and ends.
    pub day_start_utc_hour: u32,
    /// Calendars to fetch, in order. Events with equal start times keep
    /// this order on the receipt.
    pub calendars: Vec<CalendarEntry>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            credentials_file: None,
            token_path: None,
            day_start_utc_hour: DEFAULT_DAY_START_UTC_HOUR,
            calendars: vec![CalendarEntry::new("primary")],
        }
    }
}

impl GoogleSettings {
    pub fn calendar_ids(&self) -> Vec<String> {
        self.calendars.iter().map(|c| c.id.clone()).collect()
    }

    pub fn day_start_hour(&self) -> ClientResult<u32> {
        if self.day_start_utc_hour > 23 {
            return Err(ClientError::Config(format!(
                "google.day_start_utc_hour must be 0-23, got {}",
                self.day_start_utc_hour
            )));
        }
        Ok(self.day_start_utc_hour)
    }

    /// Resolves credentials and builds the provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<GoogleConfig> {
        if self.calendars.is_empty() {
            return Err(ClientError::Config(
                "at least one [[google.calendars]] entry is required".to_string(),
            ));
        }
        if let Some(entry) = self.calendars.iter().find(|c| c.id.trim().is_empty()) {
            return Err(ClientError::Config(format!(
                "calendar {:?} has an empty id",
                entry.display_name()
            )));
        }

        let credentials = self.resolve_credentials()?;
        credentials
            .validate()
            .map_err(|e| ClientError::Config(format!("invalid Google credentials: {}", e)))?;

        let mut config = GoogleConfig::new(credentials);
        if let Some(ref path) = self.token_path {
            config = config.with_token_path(path);
        }
        Ok(config)
    }

    /// Resolves OAuth credentials from the inline fields, falling back to
    /// `credentials_file`.
    pub(crate) fn resolve_credentials(&self) -> ClientResult<OAuthCredentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => {
                let id = crate::secret::resolve(id).map_err(|e| {
                    ClientError::Config(format!("failed to resolve google.client_id: {}", e))
                })?;
                let secret = crate::secret::resolve(secret).map_err(|e| {
                    ClientError::Config(format!("failed to resolve google.client_secret: {}", e))
                })?;
                Ok(OAuthCredentials::new(id, secret))
            }
            (Some(_), None) | (None, Some(_)) => Err(ClientError::Config(
                "google.client_id and google.client_secret must be set together".to_string(),
            )),
            (None, None) => match self.credentials_file {
                Some(ref path) => OAuthCredentials::from_file(path).map_err(|e| {
                    ClientError::Config(format!(
                        "failed to load credentials from {}: {}",
                        path.display(),
                        e
                    ))
                }),
                None => Err(ClientError::Config(format!(
                    "Google credentials not found. Add to {}:\n  \
                     [google]\n  \
                     client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                     client_secret = \"YOUR_SECRET\"\n\n  \
                     Or run: dayprint auth google --credentials-file <path>",
                    ClientConfig::default_path().display()
                ))),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// [weather]
// ---------------------------------------------------------------------------

/// Weather Underground settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// API key (supports secret references).
    pub api_key: Option<String>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            country: "US".to_string(),
            state: String::new(),
            city: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: WundergroundConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl WeatherSettings {
    pub fn to_provider_config(&self) -> ClientResult<WundergroundConfig> {
        let raw_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ClientError::Config("weather.api_key is required".to_string()))?;
        let api_key = crate::secret::resolve(raw_key).map_err(|e| {
            ClientError::Config(format!("failed to resolve weather.api_key: {}", e))
        })?;

        let config = WundergroundConfig::new(api_key, &self.country, &self.state, &self.city)
            .with_base_url(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        config.validate().map_err(ClientError::Config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// [printer], [display], [print]
// ---------------------------------------------------------------------------

/// Serial printer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    pub device: PathBuf,
    pub baud_rate: u32,
    pub timeout_secs: u64,
    /// Characters per line, used to center text in previews.
    pub width: usize,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_secs: 5,
            width: DEFAULT_WIDTH,
        }
    }
}

impl PrinterSettings {
    pub fn validate(&self) -> ClientResult<()> {
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(ClientError::Config(format!(
                "printer.baud_rate {} is not one of {:?}",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }
        if self.width == 0 {
            return Err(ClientError::Config(
                "printer.width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Receipt text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Line printed under "Today's Schedule" when there are no events.
    pub no_events_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            no_events_text: DEFAULT_NO_EVENTS_TEXT.to_string(),
        }
    }
}

impl DisplaySettings {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            no_events_text: self.no_events_text.clone(),
        }
    }
}

/// Print run settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// Fetch calendar and weather before printing anything.
    pub all_or_nothing: bool,
}
