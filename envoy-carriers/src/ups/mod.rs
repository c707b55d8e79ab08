//! UPS carrier implementation.
//!
//! UPS uses OAuth client credentials sent as HTTP Basic auth, then
//! `GET /api/track/v1/details/{number}` per number. Each tracking request
//! carries a unique `transId`.
//!
//! Environment: `UPS_CLIENT_ID`, `UPS_CLIENT_SECRET`

mod api;
mod descriptor;
mod error;
pub(crate) mod parser;

pub use api::{UPS_DOMAINS, UpsClient, tracking_url, transaction_id};
pub use descriptor::ups_descriptor;
pub use error::UpsError;
