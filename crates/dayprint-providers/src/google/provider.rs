//! Google Calendar provider implementation.
//!
//! Implements [`CalendarProvider`] over the Calendar API v3, obtaining an
//! access token from the stored credential, a refresh, or (when the
//! [`AuthFlow`] allows it) the interactive consent flow.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider, FetchOptions, FetchResult};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::{AuthFlow, OAuthClient};
use super::tokens::{TokenInfo, TokenStorage};

const PROVIDER_NAME: &str = "google";

/// Google Calendar provider.
pub struct GoogleProvider {
    config: GoogleConfig,
    flow: AuthFlow,
    token_storage: TokenStorage,
    oauth_client: OAuthClient,
    api_client: GoogleCalendarClient,
    /// Held across a refresh so concurrent fetches refresh once.
    tokens: Mutex<Option<TokenInfo>>,
}

impl GoogleProvider {
    /// Creates a provider and loads any stored credential. Nothing is
    /// fetched or prompted until the first call that needs a token.
    pub fn new(config: GoogleConfig, flow: AuthFlow) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let token_storage = TokenStorage::new(&config.token_path);
        let tokens = token_storage.load()?;
        let oauth_client = OAuthClient::new(
            config.credentials.clone(),
            &config.token_url,
            config.timeout,
        )?;
        let api_client = GoogleCalendarClient::new(&config.api_base, config.timeout)?;

        Ok(Self {
            config,
            flow,
            token_storage,
            oauth_client,
            api_client,
            tokens: Mutex::new(tokens),
        })
    }

    /// Runs the consent flow unconditionally and stores the new credential.
    ///
    /// Used by `dayprint auth google`; still refused under
    /// [`AuthFlow::Disabled`].
    pub async fn authenticate(&self) -> ProviderResult<()> {
        let mut guard = self.tokens.lock().await;
        let tokens = self.authorize_interactively().await?;
        *guard = Some(tokens);
        Ok(())
    }

    /// Returns a usable access token, refreshing or re-authorizing as needed.
    async fn access_token(&self) -> ProviderResult<String> {
        let mut guard = self.tokens.lock().await;

        if let Some(tokens) = guard.as_mut()
            && tokens.has_scopes(&self.config.scopes)
        {
            if !tokens.is_expired() {
                return Ok(tokens.access_token.clone());
            }

            if let Some(refresh_token) = tokens.refresh_token.clone() {
                debug!("refreshing expired access token");
                match self.oauth_client.refresh_token(&refresh_token).await {
                    Ok(refreshed) => {
                        tokens.update_access_token(
                            refreshed.access_token,
                            refreshed.expires_in,
                            refreshed.refresh_token,
                        );
                        self.token_storage.save(tokens)?;
                        return Ok(tokens.access_token.clone());
                    }
                    Err(e) if e.code() == ProviderErrorCode::AuthenticationFailed => {
                        warn!("stored refresh token was rejected: {}", e);
                    }
                    Err(e) => return Err(e.with_provider(PROVIDER_NAME)),
                }
            }
        }

        let tokens = self.authorize_interactively().await?;
        let access_token = tokens.access_token.clone();
        *guard = Some(tokens);
        Ok(access_token)
    }

    async fn authorize_interactively(&self) -> ProviderResult<TokenInfo> {
        let AuthFlow::Interactive { open_browser } = self.flow else {
            return Err(ProviderError::authentication(format!(
                "no valid Google credential at {}; run `dayprint auth google`",
                self.token_storage.path().display()
            ))
            .with_provider(PROVIDER_NAME));
        };

        info!("starting Google authorization flow");
        let tokens = self
            .oauth_client
            .authorize(
                &self.config.scopes,
                self.config.loopback_port_range,
                open_browser,
            )
            .await
            .map_err(|e| e.with_provider(PROVIDER_NAME))?;
        self.token_storage.save(&tokens)?;
        info!(
            "stored Google credential at {}",
            self.token_storage.path().display()
        );
        Ok(tokens)
    }

    async fn fetch_all_calendars(&self, options: &FetchOptions) -> ProviderResult<FetchResult> {
        let access_token = self.access_token().await?;

        let mut all_events = Vec::new();
        for calendar_id in &options.calendar_ids {
            debug!("fetching events from calendar: {}", calendar_id);
            let events = self
                .api_client
                .list_events(&access_token, calendar_id, options.time_window)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))?;
            all_events.extend(events);
        }

        Ok(FetchResult::with_events(all_events))
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<FetchResult>> {
        Box::pin(async move { self.fetch_all_calendars(&options).await })
    }

    /// True when a credential is loaded that is either unexpired or
    /// refreshable. Reports false while another task holds the token lock.
    fn is_authenticated(&self) -> bool {
        self.tokens.try_lock().is_ok_and(|tokens| {
            tokens
                .as_ref()
                .is_some_and(|t| !t.is_expired() || t.refresh_token.is_some())
        })
    }
}
