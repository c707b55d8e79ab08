//! Domain models for Envoy.
//!
//! ## Submodules
//!
//! - [`carrier`] - Carrier tags and tracking links
//! - [`event`] - Event vocabulary and tracking events
//! - [`parcel`] - Parcels and their tracking payload
//! - [`location`] - Location rendering

mod carrier;
mod event;
mod location;
mod parcel;

pub use carrier::Carrier;
pub use event::{ParcelEvent, ParcelEventType};
pub use location::{DOMESTIC_COUNTRY, Location};
pub use parcel::{Parcel, ParcelData};

#[cfg(test)]
mod serde_tests;
