//! FedEx-specific errors.

use envoy_core::Carrier;
use envoy_fetch::FetchError;
use thiserror::Error;

/// FedEx-specific errors.
#[derive(Debug, Error)]
pub enum FedexError {
    /// The OAuth endpoint answered without a usable token.
    #[error("FedEx token rejected: {0}")]
    TokenRejected(String),

    /// The tracking result carried an error object.
    #[error("{message}")]
    Tracking {
        /// FedEx error code (e.g., `TRACKING.TRACKINGNUMBER.NOTFOUND`).
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The response did not contain the requested number.
    #[error("No FedEx result for {0}")]
    MissingResult(String),

    /// The response body could not be decoded.
    #[error("Invalid FedEx response: {0}")]
    InvalidResponse(String),
}

impl From<FedexError> for FetchError {
    fn from(err: FedexError) -> Self {
        match err {
            FedexError::TokenRejected(message) => {
                FetchError::AuthenticationFailed(format!("{}: {message}", Carrier::FedEx))
            }
            FedexError::InvalidResponse(message) => FetchError::InvalidResponse(message),
            other => FetchError::Carrier(other.to_string()),
        }
    }
}
