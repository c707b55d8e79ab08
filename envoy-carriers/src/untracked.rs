//! Descriptors for carriers Envoy recognizes but cannot query.
//!
//! Numbers for these carriers are classified and linked to the carrier's
//! tracking page; no API client exists for them.

use envoy_core::Carrier;

use crate::descriptor::{CarrierDescriptor, CarrierMetadata};

fn link_only(carrier: Carrier, aliases: &'static [&'static str], website: &'static str) -> CarrierDescriptor {
    CarrierDescriptor {
        id: carrier,
        metadata: CarrierMetadata::for_carrier(carrier, aliases, website),
        api: None,
    }
}

/// DHL Express and eCommerce.
pub fn dhl_descriptor() -> CarrierDescriptor {
    link_only(Carrier::DHL, &["dhl-express"], "https://www.dhl.com")
}

/// Amazon Logistics.
pub fn amazon_descriptor() -> CarrierDescriptor {
    link_only(Carrier::Amazon, &["amzl", "amazon-logistics"], "https://track.amazon.com")
}

/// OnTrac.
pub fn ontrac_descriptor() -> CarrierDescriptor {
    link_only(Carrier::OnTrac, &[], "https://www.ontrac.com")
}

/// LaserShip.
pub fn lasership_descriptor() -> CarrierDescriptor {
    link_only(Carrier::LaserShip, &["lso"], "https://www.lasership.com")
}
