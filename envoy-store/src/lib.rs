// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Envoy Store
//!
//! Local state for the Envoy parcel tracker.
//!
//! This crate provides:
//!
//! - **JsonParcelStore**: The parcel database, implementing [`envoy_core::ParcelStore`]
//! - **Config**: Database location, HTTP timeouts, output format, and credentials
//! - **Persistence**: Atomic, owner-only JSON file I/O
//!
//! ## Usage
//!
//! ```ignore
//! use envoy_core::ParcelStore;
//! use envoy_store::{Config, JsonParcelStore};
//!
//! let config = Config::load()?;
//! let store = JsonParcelStore::open(&config.database_path)?;
//!
//! for parcel in outcome.parcels.values() {
//!     store.upsert(parcel)?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod parcel_store;
pub mod persistence;

pub use config::{CarrierCredentials, Config, CredentialsConfig, OutputFormat, mask_secret};
pub use error::StoreError;
pub use parcel_store::{JsonParcelStore, merge_parcel};
pub use persistence::{
    default_config_dir, default_config_path, default_data_dir, default_database_path, load_json,
    load_json_if_exists, save_json,
};
