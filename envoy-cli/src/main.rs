// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Envoy CLI - track FedEx, UPS and USPS parcels from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Track numbers once; the carrier is inferred from the format
//! envoy track 1Z5338FF0107231059 441259201412
//!
//! # Skip classification for numbers you know
//! envoy track --usps 9400111899223344556677,9400111899223344556678
//!
//! # Remember a parcel under a name, then refresh everything stored
//! envoy add 441259201412 --name "New shoes"
//! envoy sync
//!
//! # JSON output
//! envoy list --format json
//!
//! # Which carrier owns this number?
//! envoy classify 92001901755477000000000011
//! ```

mod commands;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use envoy_core::Carrier;
use envoy_fetch::TrackingBatch;
use envoy_store::OutputFormat;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{carriers, classify, config, parcels, track};

// ============================================================================
// CLI Definition
// ============================================================================

/// Envoy CLI - parcel tracking.
#[derive(Parser)]
#[command(name = "envoy")]
#[command(about = "Parcel tracking CLI for FedEx, UPS and USPS")]
#[command(long_about = r#"
Envoy tracks parcels across carriers and keeps a local list of them.

Supported carriers:
  • FedEx (fedex)   tracking API
  • UPS (ups)       tracking API
  • USPS (usps)     tracking API
  • DHL, Amazon, OnTrac, LaserShip   links only

Carrier API credentials are read from the config file or from
FEDEX_API_KEY/FEDEX_API_SECRET, UPS_CLIENT_ID/UPS_CLIENT_SECRET and
USPS_CONSUMER_KEY/USPS_CONSUMER_SECRET.

Examples:
  envoy track 1Z5338FF0107231059     # Track a number once
  envoy --fedex 441259201412         # Track with an explicit carrier
  envoy add 441259201412 -n Lamp     # Store a parcel under a name
  envoy sync                         # Refresh every stored parcel
  envoy list --format json           # JSON output
"#)]
#[command(version)]
#[command(author = "Envoy Contributors")]
pub struct Cli {
    /// Subcommand to run. Without one, stored parcels are listed, or the
    /// carrier flags are tracked if any were given.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path.
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format (text or json). Defaults to the configured format.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// FedEx tracking numbers, comma-separated.
    #[arg(long, global = true, value_delimiter = ',', value_name = "NUMS")]
    pub fedex: Vec<String>,

    /// UPS tracking numbers, comma-separated.
    #[arg(long, global = true, value_delimiter = ',', value_name = "NUMS")]
    pub ups: Vec<String>,

    /// USPS tracking numbers, comma-separated.
    #[arg(long, global = true, value_delimiter = ',', value_name = "NUMS")]
    pub usps: Vec<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only).
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Returns the carrier-qualified numbers from the carrier flags.
    fn carrier_flags(&self) -> [(Carrier, &[String]); 3] {
        [
            (Carrier::FedEx, self.fedex.as_slice()),
            (Carrier::UPS, self.ups.as_slice()),
            (Carrier::USPS, self.usps.as_slice()),
        ]
    }

    /// Returns true if any carrier flag was given.
    pub fn has_carrier_flags(&self) -> bool {
        self.carrier_flags().iter().any(|(_, nums)| !nums.is_empty())
    }

    /// Groups the carrier flags and the positional numbers by carrier.
    ///
    /// Flagged numbers skip classification and win over a positional
    /// duplicate.
    pub fn tracking_batch(&self, positional: &[String]) -> TrackingBatch {
        let mut batch = TrackingBatch::new();
        for (carrier, numbers) in self.carrier_flags() {
            for raw in numbers {
                batch.push_for(carrier, raw);
            }
        }
        for raw in positional {
            batch.push(raw);
        }
        batch
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Track numbers once, store the results, and print their history.
    #[command(visible_alias = "t")]
    Track(track::TrackArgs),

    /// Add numbers to the stored list without fetching.
    #[command(visible_alias = "a")]
    Add(parcels::AddArgs),

    /// Re-track every stored parcel.
    #[command(visible_alias = "s")]
    Sync,

    /// List stored parcels.
    #[command(visible_alias = "ls")]
    List,

    /// Remove stored parcels.
    #[command(visible_alias = "rm")]
    Remove(parcels::RemoveArgs),

    /// Rename a stored parcel.
    Rename(parcels::RenameArgs),

    /// Show which carrier a number belongs to, without network access.
    Classify(classify::ClassifyArgs),

    /// List carriers and whether they are configured.
    Carriers,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// At least one parcel could not be tracked.
    TrackingFailed = 2,
    /// A named parcel is not stored.
    NotFound = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "envoy=debug,info"
    } else if quiet {
        "error"
    } else {
        "envoy=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Track(args)) => track::run(args, &cli).await,
        Some(Commands::Add(args)) => parcels::add(args, &cli),
        Some(Commands::Sync) => track::sync(&cli).await,
        Some(Commands::List) => parcels::list(&cli),
        Some(Commands::Remove(args)) => parcels::remove(args, &cli),
        Some(Commands::Rename(args)) => parcels::rename(args, &cli),
        Some(Commands::Classify(args)) => classify::run(args, &cli),
        Some(Commands::Carriers) => carriers::run(&cli),
        Some(Commands::Config(args)) => config::run(args, &cli),
        None if cli.has_carrier_flags() => track::run(&track::TrackArgs::default(), &cli).await,
        None => parcels::list(&cli),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::Error
        }
    };

    process::exit(code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_carrier_flags_split_on_commas() {
        let cli = Cli::parse_from(["envoy", "--usps", "9400111899223344556677,9400111899223344556678"]);
        assert_eq!(cli.usps.len(), 2);
        assert!(cli.has_carrier_flags());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flagged_numbers_skip_classification() {
        let cli = Cli::parse_from(["envoy", "track", "1Z5338FF0107231059", "--fedex", "123456789012"]);
        let Some(Commands::Track(args)) = &cli.command else {
            panic!("expected track");
        };

        let batch = cli.tracking_batch(&args.tracking_numbers);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.groups()[&Carrier::FedEx], vec!["123456789012".to_string()]);
        assert_eq!(batch.groups()[&Carrier::UPS], vec!["1Z5338FF0107231059".to_string()]);
    }

    #[test]
    fn test_flag_wins_over_positional_duplicate() {
        let cli = Cli::parse_from(["envoy", "track", "1z5338ff0107231059", "--ups", "1Z5338FF0107231059"]);
        let Some(Commands::Track(args)) = &cli.command else {
            panic!("expected track");
        };

        let batch = cli.tracking_batch(&args.tracking_numbers);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_format_flag_parses() {
        let cli = Cli::parse_from(["envoy", "list", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(Cli::try_parse_from(["envoy", "list", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["envoy", "-q", "-v", "list"]).is_err());
    }
}
