//! Configuration management.

use envoy_core::Carrier;
use envoy_fetch::{Credentials, FetchSettings, HttpSettings, DEFAULT_MAX_CONCURRENT_REQUESTS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, default_database_path, load_json_if_exists, save_json};

/// Characters of a secret left visible when masked.
const VISIBLE_SECRET_CHARS: usize = 4;

// ============================================================================
// Output Format
// ============================================================================

/// How the CLI prints parcels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(StoreError::Config(format!(
                "unknown output format '{other}' (expected text or json)"
            ))),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// A carrier credential pair as written in the config file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierCredentials {
    /// API key, client id, or consumer key.
    pub client_id: String,
    /// Matching secret.
    pub client_secret: String,
}

impl fmt::Debug for CarrierCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarrierCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl From<&CarrierCredentials> for Credentials {
    fn from(c: &CarrierCredentials) -> Self {
        Credentials::new(c.client_id.clone(), c.client_secret.clone())
    }
}

/// Credentials per trackable carrier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// FedEx API key and secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fedex: Option<CarrierCredentials>,
    /// UPS client id and secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ups: Option<CarrierCredentials>,
    /// USPS consumer key and secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usps: Option<CarrierCredentials>,
}

impl CredentialsConfig {
    /// Returns the entry for a carrier.
    pub fn get(&self, carrier: Carrier) -> Option<&CarrierCredentials> {
        match carrier {
            Carrier::FedEx => self.fedex.as_ref(),
            Carrier::UPS => self.ups.as_ref(),
            Carrier::USPS => self.usps.as_ref(),
            _ => None,
        }
    }

    fn entries_mut(&mut self) -> [&mut Option<CarrierCredentials>; 3] {
        [&mut self.fedex, &mut self.ups, &mut self.usps]
    }
}

// ============================================================================
// Config
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parcel database file.
    pub database_path: PathBuf,
    /// HTTP timeouts.
    pub http: HttpSettings,
    /// Upper bound on in-flight requests per carrier.
    pub max_concurrent_requests: usize,
    /// Output format when `--format` is not given.
    pub default_format: OutputFormat,
    /// Carrier credentials.
    pub credentials: CredentialsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            http: HttpSettings::default(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            default_format: OutputFormat::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path, using defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        match load_json_if_exists(path)? {
            Some(config) => {
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Returns fetch settings built from this configuration.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            http: self.http,
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }

    /// Resolves credentials for every carrier.
    ///
    /// Entries in `overrides` (read from the environment) win over the file.
    /// Incomplete pairs are dropped.
    pub fn resolve_credentials(
        &self,
        overrides: HashMap<Carrier, Credentials>,
    ) -> HashMap<Carrier, Credentials> {
        let mut resolved: HashMap<Carrier, Credentials> = Carrier::all()
            .iter()
            .filter_map(|c| Some((*c, Credentials::from(self.credentials.get(*c)?))))
            .collect();
        resolved.extend(overrides);
        resolved.retain(|_, c| c.is_complete());
        resolved
    }

    /// Returns a copy with every secret masked, for display.
    #[must_use]
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        for entry in masked.credentials.entries_mut().into_iter().flatten() {
            entry.client_secret = mask_secret(&entry.client_secret);
        }
        masked
    }
}

/// Masks all but the first few characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= VISIBLE_SECRET_CHARS * 2 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().take(VISIBLE_SECRET_CHARS).collect();
    format!("{visible}{}", "*".repeat(count - VISIBLE_SECRET_CHARS))
}

// ============================================================================
// Tests
// ============================================================================
