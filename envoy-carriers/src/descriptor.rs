//! Carrier descriptor system.
//!
//! A descriptor contains all the static configuration for a carrier:
//! - Metadata (display name, CLI name, aliases, website)
//! - Tracking API configuration, for carriers Envoy can query
//! - The environment variables holding the carrier's credentials

use std::sync::Arc;

use envoy_core::Carrier;
use envoy_fetch::{CarrierClient, Credentials, FetchContext};

/// Builds a tracking client for a carrier.
pub type ClientFactory = fn(&FetchContext, Credentials) -> Arc<dyn CarrierClient>;

// ============================================================================
// Carrier Descriptor
// ============================================================================

/// Complete descriptor for a carrier.
pub struct CarrierDescriptor {
    /// Carrier identifier.
    pub id: Carrier,
    /// Display metadata.
    pub metadata: CarrierMetadata,
    /// Tracking API configuration; `None` for carriers only linked to.
    pub api: Option<ApiConfig>,
}

impl CarrierDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.metadata.display_name
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &'static str {
        self.metadata.cli_name
    }

    /// Returns true if Envoy can query this carrier's tracking API.
    pub fn is_trackable(&self) -> bool {
        self.api.is_some()
    }

    /// Builds the public tracking page link for a number.
    pub fn tracking_url(&self, tracking_number: &str) -> Option<String> {
        self.id.tracking_url(tracking_number)
    }

    /// Reads this carrier's credentials from the process environment.
    pub fn credentials_from_env(&self) -> Option<Credentials> {
        self.api.as_ref()?.credential_env.from_env()
    }

    /// Builds a tracking client, or `None` if the carrier has no API.
    pub fn build_client(
        &self,
        ctx: &FetchContext,
        credentials: Credentials,
    ) -> Option<Arc<dyn CarrierClient>> {
        self.api
            .as_ref()
            .map(|api| (api.build_client)(ctx, credentials))
    }
}

impl std::fmt::Debug for CarrierDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierDescriptor")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("trackable", &self.is_trackable())
            .finish()
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Display metadata for a carrier.
#[derive(Debug, Clone)]
pub struct CarrierMetadata {
    /// Human-readable name (e.g., "FedEx").
    pub display_name: &'static str,
    /// Lowercase name used on the command line.
    pub cli_name: &'static str,
    /// Alternative command-line names.
    pub aliases: &'static [&'static str],
    /// Carrier home page.
    pub website: &'static str,
}

impl CarrierMetadata {
    /// Metadata using the carrier's own names.
    pub fn for_carrier(
        carrier: Carrier,
        aliases: &'static [&'static str],
        website: &'static str,
    ) -> Self {
        Self {
            display_name: carrier.display_name(),
            cli_name: carrier.cli_name(),
            aliases,
            website,
        }
    }
}

// ============================================================================
// API Config
// ============================================================================

/// How to reach a carrier's tracking API.
pub struct ApiConfig {
    /// Environment variables holding the credentials.
    pub credential_env: CredentialEnv,
    /// Hosts the client may contact.
    pub allowed_domains: &'static [&'static str],
    /// Client constructor.
    pub build_client: ClientFactory,
}

/// Names of the environment variables holding a credential pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialEnv {
    /// Variable holding the API key, client id, or consumer key.
    pub id_var: &'static str,
    /// Variable holding the matching secret.
    pub secret_var: &'static str,
}

impl CredentialEnv {
    /// Resolves credentials through `lookup`, requiring both halves.
    pub fn resolve_with<F>(&self, lookup: F) -> Option<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::new(lookup(self.id_var)?, lookup(self.secret_var)?);
        credentials.is_complete().then_some(credentials)
    }

    /// Resolves credentials from the process environment.
    pub fn from_env(&self) -> Option<Credentials> {
        self.resolve_with(|name| std::env::var(name).ok())
    }
}

// ============================================================================
// Tests
// ============================================================================
