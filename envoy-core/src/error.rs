//! Core error types for Envoy.

use thiserror::Error;

/// Core error type for Envoy operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A carrier name could not be parsed.
    #[error("Unknown carrier: {0}")]
    UnknownCarrier(String),

    /// A tracking number was empty after normalization.
    #[error("Invalid tracking number: {0:?}")]
    InvalidTrackingNumber(String),

    /// Invalid data in a stored or received parcel.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
