//! Unified error types.
//!
//! Two levels: [`HttpError`] classifies what happened on the wire, and
//! [`CosmicError`] is the public taxonomy every source and the aggregation
//! engine report. Upstream variants name their [`Provider`] so `Display`
//! yields a message that can be shown to a user as-is.

use std::fmt;
use thiserror::Error;

/// The upstream provider a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Crypto price feed.
    CoinGecko,
    /// Near-Earth-object catalog.
    NeoWs,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::CoinGecko => write!(f, "CoinGecko"),
            Provider::NeoWs => write!(f, "NASA NeoWs"),
        }
    }
}

/// Top-level error.
#[derive(Error, Debug)]
pub enum CosmicError {
    /// Caller or internal misuse; raised before any network call.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid response from {provider} API: {reason}")]
    UpstreamInvalidResponse { provider: Provider, reason: String },

    #[error("{provider} API request timed out. Please try again.")]
    UpstreamTimeout { provider: Provider },

    #[error("{provider} API rate limit exceeded. Please wait before retrying.")]
    UpstreamRateLimited { provider: Provider },

    #[error("{provider} API server error ({status}). Please try again later.")]
    UpstreamServerError { provider: Provider, status: u16 },

    #[error("{provider} API request failed ({status}): {message}")]
    UpstreamClientError {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure with no HTTP status (DNS, refused connection, TLS).
    #[error("{provider} API request failed: {message}")]
    UpstreamUnreachable { provider: Provider, message: String },
}

impl CosmicError {
    /// Classify a transport-level failure for the given provider.
    pub fn upstream(provider: Provider, err: HttpError) -> Self {
        match err {
            HttpError::Timeout => CosmicError::UpstreamTimeout { provider },
            HttpError::RateLimited { .. } => CosmicError::UpstreamRateLimited { provider },
            HttpError::ServerError { status, .. } => {
                CosmicError::UpstreamServerError { provider, status }
            }
            HttpError::Forbidden => CosmicError::UpstreamClientError {
                provider,
                status: 403,
                message: "access forbidden. Check API key configuration.".to_string(),
            },
            HttpError::ClientError { status, body } => CosmicError::UpstreamClientError {
                provider,
                status,
                message: if body.is_empty() {
                    "no message".to_string()
                } else {
                    body
                },
            },
            HttpError::Decode(reason) => {
                CosmicError::UpstreamInvalidResponse { provider, reason }
            }
            HttpError::MaxRetriesExceeded { last_error, .. } => {
                CosmicError::upstream(provider, *last_error)
            }
            #[cfg(feature = "http")]
            HttpError::Reqwest(re) => {
                if re.is_timeout() {
                    CosmicError::UpstreamTimeout { provider }
                } else if re.is_decode() {
                    CosmicError::UpstreamInvalidResponse {
                        provider,
                        reason: re.to_string(),
                    }
                } else {
                    CosmicError::UpstreamUnreachable {
                        provider,
                        message: re.to_string(),
                    }
                }
            }
        }
    }

    /// Build an `UpstreamInvalidResponse` for the given provider.
    pub fn invalid_response(provider: Provider, reason: impl Into<String>) -> Self {
        CosmicError::UpstreamInvalidResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// The provider this error came from, if it is an upstream failure.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            CosmicError::InvalidParameter(_) | CosmicError::Config(_) => None,
            CosmicError::UpstreamInvalidResponse { provider, .. }
            | CosmicError::UpstreamTimeout { provider }
            | CosmicError::UpstreamRateLimited { provider }
            | CosmicError::UpstreamServerError { provider, .. }
            | CosmicError::UpstreamClientError { provider, .. }
            | CosmicError::UpstreamUnreachable { provider, .. } => Some(*provider),
        }
    }

    /// Message suitable for display next to stale data.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Forbidden")]
    Forbidden,

    #[error("Client error {status}: {body}")]
    ClientError { status: u16, body: String },

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        attempts: u32,
        last_error: Box<HttpError>,
    },
}

/// Map a non-success status code to an [`HttpError`].
pub fn classify_status(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        403 => HttpError::Forbidden,
        408 => HttpError::Timeout,
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::ClientError { status, body },
        _ => HttpError::ServerError { status, body },
    }
}
