//! USPS carrier descriptor.

use std::sync::Arc;

use envoy_core::Carrier;
use envoy_fetch::{CarrierClient, Credentials, FetchContext};

use super::api::{USPS_DOMAINS, UspsClient};
use crate::descriptor::{ApiConfig, CarrierDescriptor, CarrierMetadata, CredentialEnv};

/// Creates the USPS carrier descriptor.
pub fn usps_descriptor() -> CarrierDescriptor {
    CarrierDescriptor {
        id: Carrier::USPS,
        metadata: usps_metadata(),
        api: Some(usps_api_config()),
    }
}

fn usps_metadata() -> CarrierMetadata {
    CarrierMetadata::for_carrier(Carrier::USPS, &["postal", "us-mail"], "https://www.usps.com")
}

fn usps_api_config() -> ApiConfig {
    ApiConfig {
        credential_env: CredentialEnv {
            id_var: "USPS_CONSUMER_KEY",
            secret_var: "USPS_CONSUMER_SECRET",
        },
        allowed_domains: USPS_DOMAINS,
        build_client: build_usps_client,
    }
}

fn build_usps_client(ctx: &FetchContext, credentials: Credentials) -> Arc<dyn CarrierClient> {
    Arc::new(UspsClient::new(ctx, credentials))
}
