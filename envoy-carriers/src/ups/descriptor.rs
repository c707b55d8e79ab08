//! UPS carrier descriptor.

use std::sync::Arc;

use envoy_core::Carrier;
use envoy_fetch::{CarrierClient, Credentials, FetchContext};

use super::api::{UPS_DOMAINS, UpsClient};
use crate::descriptor::{ApiConfig, CarrierDescriptor, CarrierMetadata, CredentialEnv};

/// Creates the UPS carrier descriptor.
pub fn ups_descriptor() -> CarrierDescriptor {
    CarrierDescriptor {
        id: Carrier::UPS,
        metadata: ups_metadata(),
        api: Some(ups_api_config()),
    }
}

fn ups_metadata() -> CarrierMetadata {
    CarrierMetadata::for_carrier(Carrier::UPS, &["united-parcel-service"], "https://www.ups.com")
}

fn ups_api_config() -> ApiConfig {
    ApiConfig {
        credential_env: CredentialEnv {
            id_var: "UPS_CLIENT_ID",
            secret_var: "UPS_CLIENT_SECRET",
        },
        allowed_domains: UPS_DOMAINS,
        build_client: build_ups_client,
    }
}

fn build_ups_client(ctx: &FetchContext, credentials: Credentials) -> Arc<dyn CarrierClient> {
    Arc::new(UpsClient::new(ctx, credentials))
}
