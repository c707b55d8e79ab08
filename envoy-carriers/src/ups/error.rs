//! UPS-specific errors.

use envoy_core::Carrier;
use envoy_fetch::FetchError;
use thiserror::Error;

/// UPS-specific errors.
#[derive(Debug, Error)]
pub enum UpsError {
    /// The OAuth endpoint answered without a usable token.
    #[error("UPS token rejected: {0}")]
    TokenRejected(String),

    /// UPS has no record of the number (HTTP 404).
    #[error("{0}")]
    NotFound(String),

    /// The shipment carried a warning instead of package detail.
    #[error("{message}")]
    Tracking {
        /// UPS warning code (e.g., `TW0001`).
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The response did not contain the requested number.
    #[error("No UPS package for {0}")]
    MissingResult(String),

    /// The response body could not be decoded.
    #[error("Invalid UPS response: {0}")]
    InvalidResponse(String),
}

impl From<UpsError> for FetchError {
    fn from(err: UpsError) -> Self {
        match err {
            UpsError::TokenRejected(message) => {
                FetchError::AuthenticationFailed(format!("{}: {message}", Carrier::UPS))
            }
            UpsError::InvalidResponse(message) => FetchError::InvalidResponse(message),
            other => FetchError::Carrier(other.to_string()),
        }
    }
}
