//! OAuth 2.0 PKCE flow for Google APIs.
//!
//! The interactive flow is the Authorization Code flow with PKCE and a
//! loopback redirect:
//!
//! 1. Generate a code verifier and its SHA-256 challenge
//! 2. Bind a local listener on the first free port in a range
//! 3. Open (or print) Google's consent URL
//! 4. Receive `GET /callback?code=..&state=..` on the listener
//! 5. Exchange the code plus verifier for tokens
//!
//! Whether that flow may run at all is decided by the caller through
//! [`AuthFlow`]; an unattended print job passes [`AuthFlow::Disabled`].

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::OAuthCredentials;
use super::tokens::TokenInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long to wait for the browser to hit the loopback callback.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Whether a provider may start the interactive consent flow when it has no
/// usable credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    /// Run the loopback flow. With `open_browser` false the consent URL is
    /// only printed, for headless machines.
    Interactive { open_browser: bool },
    /// Fail with `AuthenticationFailed` instead of prompting.
    Disabled,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::Interactive { open_browser: true }
    }
}

/// Access token returned by a refresh.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_in: Option<i64>,
    /// Set when Google rotates the refresh token.
    pub refresh_token: Option<String>,
}

/// OAuth client for Google APIs.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    token_url: String,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(
        credentials: OAuthCredentials,
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            token_url: token_url.into(),
            http_client,
        })
    }

    /// Runs the interactive PKCE flow and returns the obtained tokens.
    ///
    /// # Errors
    ///
    /// Fails if no loopback port is free, the user denies consent, the
    /// callback does not arrive within [`CALLBACK_TIMEOUT`], or the code
    /// exchange is rejected.
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
        open_browser: bool,
    ) -> ProviderResult<TokenInfo> {
        let pkce = PkceFlow::new();

        let (listener, port) = bind_loopback_server(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, scopes);

        debug!("authorization URL: {}", auth_url);
        if open_browser {
            info!("starting OAuth flow, opening browser");
            if let Err(e) = open::that(&auth_url) {
                warn!("failed to open browser: {}", e);
                eprintln!("\nOpen this URL in your browser:\n\n{}\n", auth_url);
            }
        } else {
            eprintln!("\nOpen this URL in a browser on this machine:\n\n{}\n", auth_url);
        }

        // The listener blocks; keep it off the runtime's worker threads.
        let callback = tokio::task::spawn_blocking(move || wait_for_callback(listener))
            .await
            .map_err(|e| ProviderError::internal(format!("callback listener failed: {}", e)))??;

        if callback.state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch in callback",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", callback.code.as_str()),
            ("code_verifier", pkce.verifier.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let response = self.post_token(&params, "token exchange").await?;

        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            scopes.to_vec(),
        ))
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// A rejected refresh token yields `AuthenticationFailed`; an unavailable
    /// token endpoint yields `ServerError` or `RateLimited`.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<RefreshedToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.post_token(&params, "token refresh").await?;

        info!("refreshed access token");
        Ok(RefreshedToken {
            access_token: response.access_token,
            expires_in: response.expires_in,
            refresh_token: response.refresh_token,
        })
    }

    async fn post_token(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{} request failed: {}", what, e)).with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(token_error(status.as_u16(), what, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))
    }
}

/// Google answers 400 `invalid_grant` (or `invalid_client`) for revoked,
/// expired or foreign grants; only those mean the grant itself is bad.
fn token_error(status: u16, what: &str, body: &str) -> ProviderError {
    match status {
        400 | 401 => ProviderError::authentication(format!(
            "{} failed ({}): {}",
            what,
            status,
            body.trim()
        )),
        _ => ProviderError::from_status(status, &format!("{} failed: {}", what, body.trim())),
    }
}

/// Tries to bind a TCP listener on an available port in the given range.
fn bind_loopback_server(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!("bound loopback server on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Code and state carried by the OAuth redirect.
#[derive(Debug, PartialEq, Eq)]
struct Callback {
    code: String,
    state: String,
}

fn wait_for_callback(listener: TcpListener) -> ProviderResult<Callback> {
    let (tx, rx) = mpsc::channel();

    // Accept on a helper thread so the wait below can time out. The thread
    // is left blocked in accept() if nothing ever connects.
    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(ProviderError::authentication("timed out waiting for OAuth callback"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(ProviderError::internal("callback channel disconnected"))
        }
    }
}

/// Answers one request on the loopback listener. Returns `None` for
/// requests that are not the callback (favicon probes and the like).
fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<Callback>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    // GET /callback?code=...&state=... HTTP/1.1
    let mut parts = request_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let path = parts.next()?;
    if !path.starts_with("/callback") {
        return None;
    }

    let result = parse_callback(path);
    let response = if result.is_ok() {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization Successful</h1>\
        <p>You can close this window and return to the terminal.</p></body></html>"
    } else {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization Failed</h1>\
        <p>You can close this window.</p></body></html>"
    };
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    Some(result)
}

fn parse_callback(path: &str) -> ProviderResult<Callback> {
    // The request line only carries the path; any base works for parsing.
    let url = url::Url::parse("http://localhost")
        .and_then(|base| base.join(path))
        .map_err(|e| ProviderError::authentication(format!("malformed callback: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(ProviderError::authentication(format!(
                    "authorization denied: {}",
                    value
                )));
            }
            _ => {}
        }
    }

    match code {
        Some(code) => Ok(Callback {
            code,
            state: state.unwrap_or_default(),
        }),
        None => Err(ProviderError::authentication(
            "missing authorization code in callback",
        )),
    }
}

/// PKCE verifier, challenge and CSRF state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    /// SHA-256 of the verifier, base64url encoded.
    pub challenge: String,
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    fn compute_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Builds the Google OAuth consent URL.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}
