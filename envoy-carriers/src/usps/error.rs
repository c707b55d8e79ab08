//! USPS-specific errors.

use envoy_core::Carrier;
use envoy_fetch::FetchError;
use thiserror::Error;

/// USPS-specific errors.
#[derive(Debug, Error)]
pub enum UspsError {
    /// The OAuth endpoint answered without an approved tracking token.
    #[error("USPS token rejected: {0}")]
    TokenRejected(String),

    /// USPS has no record of the number (HTTP 404).
    #[error("{0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("Invalid USPS response: {0}")]
    InvalidResponse(String),
}

impl From<UspsError> for FetchError {
    fn from(err: UspsError) -> Self {
        match err {
            UspsError::TokenRejected(message) => {
                FetchError::AuthenticationFailed(format!("{}: {message}", Carrier::USPS))
            }
            UspsError::NotFound(message) => FetchError::Carrier(message),
            UspsError::InvalidResponse(message) => FetchError::InvalidResponse(message),
        }
    }
}
