// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Envoy Carriers
//!
//! Carrier-specific tracking clients for Envoy.
//!
//! Each trackable carrier module includes:
//!
//! - **Descriptor**: Static configuration (metadata, credentials, allowed hosts)
//! - **API client**: OAuth token exchange and per-number tracking requests
//! - **Parser**: Wire schema and normalization into [`envoy_core::ParcelData`]
//!
//! ## Supported Carriers
//!
//! | Carrier | Tracking API | Auth | Credentials |
//! |---------|--------------|------|-------------|
//! | FedEx | Track v1 | OAuth form | `FEDEX_API_KEY`, `FEDEX_API_SECRET` |
//! | UPS | Track v1 | OAuth Basic | `UPS_CLIENT_ID`, `UPS_CLIENT_SECRET` |
//! | USPS | Tracking v3 | OAuth JSON | `USPS_CONSUMER_KEY`, `USPS_CONSUMER_SECRET` |
//! | DHL | link only | | |
//! | Amazon | link only | | |
//! | OnTrac | link only | | |
//! | LaserShip | link only | | |
//!
//! ## Usage
//!
//! ```ignore
//! use envoy_carriers::CarrierRegistry;
//! use envoy_fetch::FetchContext;
//!
//! let ctx = FetchContext::new()?;
//! let credentials = CarrierRegistry::credentials_from_env();
//! let tracker = CarrierRegistry::build_tracker(&ctx, &credentials);
//!
//! let outcome = tracker.track_all(&["1Z5338FF0107231059"]).await;
//! ```

pub mod common;
pub mod descriptor;
pub mod registry;
pub mod untracked;

// Carrier modules (alphabetical)
pub mod fedex;
pub mod ups;
pub mod usps;

// Re-export key types
pub use descriptor::{ApiConfig, CarrierDescriptor, CarrierMetadata, ClientFactory, CredentialEnv};
pub use registry::CarrierRegistry;

// Re-export carrier descriptors
pub use fedex::fedex_descriptor;
pub use untracked::{amazon_descriptor, dhl_descriptor, lasership_descriptor, ontrac_descriptor};
pub use ups::ups_descriptor;
pub use usps::usps_descriptor;

// Re-export clients for convenience
pub use fedex::{FedexClient, FedexError};
pub use ups::{UpsClient, UpsError};
pub use usps::{UspsClient, UspsError};
