//! USPS carrier implementation.
//!
//! USPS exchanges a consumer key and secret for a token scoped to
//! `tracking`, then serves `GET /tracking/v3/tracking/{number}?expand=DETAIL`.
//!
//! Environment: `USPS_CONSUMER_KEY`, `USPS_CONSUMER_SECRET`

mod api;
mod descriptor;
mod error;
pub(crate) mod parser;

pub use api::{USPS_DOMAINS, UspsClient, tracking_url};
pub use descriptor::usps_descriptor;
pub use error::UspsError;
