//! Fetch error types.

use envoy_core::Carrier;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for carrier fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// No credentials configured for the carrier.
    #[error("No credentials configured for {0}")]
    MissingCredentials(Carrier),

    /// The carrier rejected the credentials or the token exchange failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success HTTP status from a carrier endpoint.
    #[error("{carrier} returned HTTP {status}: {message}")]
    Status {
        /// Carrier that answered.
        carrier: Carrier,
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the body, if any.
        message: String,
    },

    /// The carrier reported an error for the tracking number itself.
    #[error("{0}")]
    Carrier(String),

    /// Invalid response from the carrier.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] envoy_core::CoreError),

    /// No client is registered for the carrier.
    #[error("Tracking not supported for {0}")]
    UnsupportedCarrier(Carrier),
}

impl FetchError {
    /// Returns true if this error came from the credential exchange.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::AuthenticationFailed(_) | Self::MissingCredentials(_) => true,
            Self::Status { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(HttpError::from(err))
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Could not connect.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}
