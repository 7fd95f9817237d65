//! Google Calendar provider.
//!
//! [`GoogleProvider`] lists events from one or more calendars through the
//! Calendar API v3.
//!
//! # Authentication
//!
//! 1. The user registers their own OAuth client (Google requires one)
//! 2. A stored token is used if unexpired, refreshed if it has expired
//! 3. Otherwise, if the [`AuthFlow`] permits, the PKCE loopback flow runs:
//!    a local listener receives the redirect from Google's consent page
//! 4. The resulting token is written to disk with owner-only permissions
//!
//! # Example
//!
//! ```ignore
//! use dayprint_providers::google::{AuthFlow, GoogleConfig, GoogleProvider, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("client_secret.json")?;
//! let provider = GoogleProvider::new(GoogleConfig::new(credentials), AuthFlow::Disabled)?;
//! let events = fetch_todays_events(&provider, &calendar_ids, window).await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::{CALENDAR_API_BASE, GoogleCalendarClient};
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{AuthFlow, CALLBACK_TIMEOUT, OAuthClient, PkceFlow, RefreshedToken};
pub use provider::GoogleProvider;
pub use tokens::{TokenInfo, TokenStorage};
