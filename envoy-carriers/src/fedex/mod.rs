//! FedEx carrier implementation.
//!
//! FedEx uses OAuth client credentials (API key and secret key) exchanged at
//! `/oauth/token`, then `POST /track/v1/trackingnumbers` per number.
//!
//! Environment: `FEDEX_API_KEY`, `FEDEX_API_SECRET`

mod api;
mod descriptor;
mod error;
pub(crate) mod parser;

pub use api::{FEDEX_DOMAINS, FedexClient, TrackingRequest};
pub use descriptor::fedex_descriptor;
pub use error::FedexError;
