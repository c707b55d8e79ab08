//! Carrier registry for managing all carrier descriptors.
//!
//! The registry provides static access to every carrier configuration and
//! is where the CLI turns configured credentials into a [`Tracker`].

use std::collections::HashMap;
use std::sync::OnceLock;

use envoy_core::Carrier;
use envoy_fetch::{Credentials, FetchContext, Tracker};
use tracing::{debug, warn};

use crate::descriptor::CarrierDescriptor;
use crate::fedex::fedex_descriptor;
use crate::ups::ups_descriptor;
use crate::untracked::{amazon_descriptor, dhl_descriptor, lasership_descriptor, ontrac_descriptor};
use crate::usps::usps_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all carrier descriptors.
static DESCRIPTORS: OnceLock<Vec<CarrierDescriptor>> = OnceLock::new();

/// Static storage for CLI name to carrier mapping.
static CLI_NAME_MAP: OnceLock<HashMap<String, Carrier>> = OnceLock::new();

/// Initializes all carrier descriptors.
///
/// Trackable carriers come first, then link-only ones.
fn init_descriptors() -> Vec<CarrierDescriptor> {
    vec![
        // Tracking APIs
        fedex_descriptor(),
        ups_descriptor(),
        usps_descriptor(),
        // Deep links only
        dhl_descriptor(),
        amazon_descriptor(),
        ontrac_descriptor(),
        lasership_descriptor(),
    ]
}

/// Builds the CLI name to carrier mapping. Keys are lowercase.
fn build_cli_name_map(descriptors: &[CarrierDescriptor]) -> HashMap<String, Carrier> {
    let mut map = HashMap::new();

    for desc in descriptors {
        map.insert(desc.cli_name().to_string(), desc.id);
        for alias in desc.metadata.aliases {
            map.insert(alias.to_ascii_lowercase(), desc.id);
        }
    }

    map
}

// ============================================================================
// Carrier Registry
// ============================================================================

/// Global registry of all carrier descriptors.
pub struct CarrierRegistry;

impl CarrierRegistry {
    /// Returns all carrier descriptors.
    pub fn all() -> &'static [CarrierDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a carrier descriptor.
    pub fn get(id: Carrier) -> Option<&'static CarrierDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Returns the CLI name to carrier mapping.
    pub fn cli_name_map() -> &'static HashMap<String, Carrier> {
        CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()))
    }

    /// Looks up a carrier by CLI name or alias, ignoring case.
    pub fn get_by_cli_name(name: &str) -> Option<&'static CarrierDescriptor> {
        let carrier = Self::cli_name_map().get(&name.trim().to_ascii_lowercase())?;
        Self::get(*carrier)
    }

    /// Returns carriers with a tracking API.
    pub fn trackable() -> Vec<&'static CarrierDescriptor> {
        Self::all().iter().filter(|d| d.is_trackable()).collect()
    }

    /// Returns the number of registered carriers.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Reads every trackable carrier's credentials from the environment.
    pub fn credentials_from_env() -> HashMap<Carrier, Credentials> {
        Self::trackable()
            .into_iter()
            .filter_map(|d| Some((d.id, d.credentials_from_env()?)))
            .collect()
    }

    /// Builds a tracker with a client for every trackable carrier.
    ///
    /// A carrier without credentials still gets a client; its numbers fail
    /// with a missing-credentials error instead of going unreported.
    pub fn build_tracker(ctx: &FetchContext, credentials: &HashMap<Carrier, Credentials>) -> Tracker {
        let mut tracker = Tracker::new();

        for desc in Self::trackable() {
            let creds = match credentials.get(&desc.id) {
                Some(creds) if creds.is_complete() => creds.clone(),
                _ => {
                    warn!(carrier = %desc.id, "No credentials configured");
                    Credentials::new("", "")
                }
            };
            if let Some(client) = desc.build_client(ctx, creds) {
                debug!(carrier = %desc.id, client = %client.id(), "Registered carrier client");
                tracker.register(client);
            }
        }

        tracker
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_known_carriers() {
        assert_eq!(CarrierRegistry::count(), 7);
        for carrier in Carrier::all().iter().filter(|c| **c != Carrier::Unknown) {
            let desc = CarrierRegistry::get(*carrier);
            assert!(desc.is_some(), "Should find carrier {carrier:?}");
            assert_eq!(desc.unwrap().is_trackable(), carrier.is_trackable());
        }
        assert!(CarrierRegistry::get(Carrier::Unknown).is_none());
    }

    #[test]
    fn test_cli_name_lookup() {
        assert_eq!(CarrierRegistry::get_by_cli_name("fedex").unwrap().id, Carrier::FedEx);
        assert_eq!(CarrierRegistry::get_by_cli_name("UPS").unwrap().id, Carrier::UPS);
        assert_eq!(CarrierRegistry::get_by_cli_name(" usps ").unwrap().id, Carrier::USPS);

        // Aliases
        assert_eq!(CarrierRegistry::get_by_cli_name("fdx").unwrap().id, Carrier::FedEx);
        assert_eq!(CarrierRegistry::get_by_cli_name("amzl").unwrap().id, Carrier::Amazon);

        assert!(CarrierRegistry::get_by_cli_name("pony-express").is_none());
    }

    #[test]
    fn test_trackable_carriers() {
        let ids: Vec<_> = CarrierRegistry::trackable().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![Carrier::FedEx, Carrier::UPS, Carrier::USPS]);
    }

    #[test]
    fn test_descriptor_links() {
        let dhl = CarrierRegistry::get(Carrier::DHL).unwrap();
        assert_eq!(
            dhl.tracking_url("1234567890").as_deref(),
            Some("https://www.dhl.com/us-en/home/tracking.html?tracking-id=1234567890")
        );
        assert!(dhl.credentials_from_env().is_none());
    }

    #[test]
    fn test_build_tracker_registers_all_trackable() {
        let ctx = FetchContext::new().unwrap();
        let mut credentials = HashMap::new();
        credentials.insert(Carrier::FedEx, Credentials::new("key", "secret"));

        let tracker = CarrierRegistry::build_tracker(&ctx, &credentials);
        assert!(tracker.supports(Carrier::FedEx));
        assert!(tracker.supports(Carrier::UPS));
        assert!(tracker.supports(Carrier::USPS));
        assert!(!tracker.supports(Carrier::DHL));
    }

    #[tokio::test]
    async fn test_unconfigured_carrier_reports_per_number() {
        let ctx = FetchContext::new().unwrap();
        let tracker = CarrierRegistry::build_tracker(&ctx, &HashMap::new());

        let outcome = tracker.track_all(&["1Z5338FF0107231059"]).await;
        let parcel = &outcome.parcels["1Z5338FF0107231059"];
        assert!(parcel.has_error());
        assert!(parcel.error.as_deref().unwrap().contains("UPS"));
    }
}
