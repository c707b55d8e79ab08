//! CLI command implementations.

pub mod carriers;
pub mod classify;
pub mod config;
pub mod parcels;
pub mod track;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use envoy_carriers::CarrierRegistry;
use envoy_core::{Carrier, Parcel};
use envoy_fetch::{Credentials, FetchContext, Tracker};
use envoy_store::{Config, JsonParcelStore, OutputFormat};
use std::collections::HashMap;
use tracing::debug;

use crate::Cli;
use crate::output::{JsonFormatter, TextFormatter};

/// Returns true if text output should carry ANSI colors.
///
/// `--no-color`, a set `NO_COLOR`, or a non-terminal stdout turn them off.
pub fn use_colors(cli: &Cli) -> bool {
    !cli.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Configuration and output settings shared by every command.
pub struct Session {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
    pub use_colors: bool,
}

impl Session {
    /// Loads the configuration named on the command line, or the default one.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
        let config = Config::load_from(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        debug!(path = %config_path.display(), "Using configuration");

        Ok(Self {
            format: cli.format.unwrap_or(config.default_format),
            use_colors: use_colors(cli),
            config,
            config_path,
        })
    }

    /// Opens the parcel database.
    pub fn open_store(&self) -> Result<JsonParcelStore> {
        let path = &self.config.database_path;
        JsonParcelStore::open(path)
            .with_context(|| format!("Failed to open parcel database {}", path.display()))
    }

    /// Resolves credentials; environment variables win over the config file.
    pub fn credentials(&self) -> HashMap<Carrier, Credentials> {
        self.config
            .resolve_credentials(CarrierRegistry::credentials_from_env())
    }

    /// Builds a tracker with a client for every trackable carrier.
    pub fn tracker(&self) -> Result<Tracker> {
        let ctx = FetchContext::builder()
            .settings(self.config.fetch_settings())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(CarrierRegistry::build_tracker(&ctx, &self.credentials()))
    }

    /// Returns a text formatter honoring the color setting.
    pub fn text(&self) -> TextFormatter {
        TextFormatter::new(self.use_colors)
    }

    /// Prints parcels with their full event history.
    pub fn print_histories(&self, parcels: &[Parcel]) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                let formatter = self.text();
                for parcel in parcels {
                    print!("{}", formatter.format_history(parcel));
                }
            }
            OutputFormat::Json => println!("{}", JsonFormatter::format_parcels(parcels)?),
        }
        Ok(())
    }
}
