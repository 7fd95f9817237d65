//! Client error types.

use dayprint_printer::PrinterError;
use dayprint_providers::{ProviderError, ProviderErrorCode};
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a `dayprint` run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A remote service was unreachable, timed out, or answered with an error status.
    #[error("network error: {0}")]
    Network(String),

    /// A remote service answered with a body we could not use.
    #[error("parse error: {0}")]
    Parse(String),

    /// No usable credential, or the credential was refused.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The printer could not be opened, configured or written.
    #[error("printer error: {0}")]
    Device(#[from] PrinterError),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err.code() {
            ProviderErrorCode::NetworkError
            | ProviderErrorCode::RateLimited
            | ProviderErrorCode::ServerError => Self::Network(message),
            ProviderErrorCode::InvalidResponse => Self::Parse(message),
            ProviderErrorCode::AuthenticationFailed | ProviderErrorCode::AuthorizationFailed => {
                Self::Auth(message)
            }
            ProviderErrorCode::ConfigurationError | ProviderErrorCode::InternalError => {
                Self::Config(message)
            }
        }
    }
}
