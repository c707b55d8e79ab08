// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Envoy Core
//!
//! Core types, models, and traits for the Envoy parcel tracker.
//!
//! This crate provides the foundational abstractions used across all other
//! Envoy crates, including:
//!
//! - Domain models (carriers, parcels, tracking events)
//! - Tracking number classification
//! - Error types
//! - The storage trait the tracking pipeline writes through
//!
//! ## Key Types
//!
//! ### Parcel Types
//! - [`Carrier`] - Enum of every carrier a tracking number can belong to
//! - [`Parcel`] - One tracked shipment, keyed by tracking number
//! - [`ParcelData`] - Events, delivered flag, and delivery projection
//! - [`ParcelEvent`] - One timestamped milestone
//! - [`ParcelEventType`] - Event vocabulary shared by all carriers
//! - [`Location`] - Event location rendering
//!
//! ### Classification
//! - [`classify()`] - Map a raw tracking number to a [`Carrier`]
//! - [`classify_detailed()`] - Same, also naming the matched format

pub mod classify;
pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    Carrier, DOMESTIC_COUNTRY, Location, Parcel, ParcelData, ParcelEvent, ParcelEventType,
};

// Re-export classification
pub use classify::{Classification, classify, classify_detailed, normalize};

// Re-export traits
pub use traits::ParcelStore;
