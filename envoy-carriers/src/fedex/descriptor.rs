//! FedEx carrier descriptor.

use std::sync::Arc;

use envoy_core::Carrier;
use envoy_fetch::{CarrierClient, Credentials, FetchContext};

use super::api::{FEDEX_DOMAINS, FedexClient};
use crate::descriptor::{ApiConfig, CarrierDescriptor, CarrierMetadata, CredentialEnv};

/// Creates the FedEx carrier descriptor.
pub fn fedex_descriptor() -> CarrierDescriptor {
    CarrierDescriptor {
        id: Carrier::FedEx,
        metadata: fedex_metadata(),
        api: Some(fedex_api_config()),
    }
}

fn fedex_metadata() -> CarrierMetadata {
    CarrierMetadata::for_carrier(Carrier::FedEx, &["fdx", "federal-express"], "https://www.fedex.com")
}

fn fedex_api_config() -> ApiConfig {
    ApiConfig {
        credential_env: CredentialEnv {
            id_var: "FEDEX_API_KEY",
            secret_var: "FEDEX_API_SECRET",
        },
        allowed_domains: FEDEX_DOMAINS,
        build_client: build_fedex_client,
    }
}

fn build_fedex_client(ctx: &FetchContext, credentials: Credentials) -> Arc<dyn CarrierClient> {
    Arc::new(FedexClient::new(ctx, credentials))
}
