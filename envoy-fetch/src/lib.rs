// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Envoy Fetch
//!
//! HTTP transport, credentials, and tracking orchestration for Envoy.
//!
//! ## Transport
//!
//! - [`http::HttpClient`] - reqwest wrapper with tracing, bounded timeouts,
//!   and a per-carrier domain allowlist
//! - [`token::TokenCache`] - single-flight bearer token cache
//! - [`context::FetchContext`] - HTTP client plus settings, passed to clients
//!
//! ## Tracking
//!
//! - [`carrier::CarrierClient`] - Trait each carrier implements
//! - [`tracker::Tracker`] - Classifies, fans out per carrier, and merges
//!
//! ## Example
//!
//! ```ignore
//! use envoy_fetch::{FetchContext, Tracker};
//!
//! let ctx = FetchContext::new()?;
//! let tracker = Tracker::with_clients(vec![
//!     Arc::new(FedexClient::new(&ctx, fedex_credentials)),
//!     Arc::new(UpsClient::new(&ctx, ups_credentials)),
//! ]);
//!
//! let outcome = tracker.track_all(&["1Z1234567890123456"]).await;
//! for parcel in outcome.parcels.values() {
//!     println!("{}: {:?}", parcel.tracking_number, parcel.status());
//! }
//! ```

pub mod carrier;
pub mod context;
pub mod error;
pub mod http;
pub mod token;
pub mod tracker;

// Errors
pub use error::{FetchError, HttpError};

// Transport
pub use context::{DEFAULT_MAX_CONCURRENT_REQUESTS, FetchContext, FetchContextBuilder, FetchSettings};
pub use http::{HttpClient, HttpSettings};
pub use token::{AccessToken, Credentials, EXPIRY_SKEW_SECS, TokenCache};

// Tracking
pub use carrier::{CarrierClient, track_each};
pub use tracker::{BatchReport, ParcelMerger, TrackOutcome, Tracker, TrackingBatch};

#[cfg(test)]
mod tracker_tests;
