//! Carriers command - list carriers and their configuration state.

use anyhow::Result;
use envoy_carriers::CarrierRegistry;
use envoy_store::OutputFormat;
use tracing::info;

use super::Session;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode};

/// Runs the carriers command.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    info!("Listing carriers");

    let session = Session::load(cli)?;
    let credentials = session.credentials();
    let carriers: Vec<_> = CarrierRegistry::all()
        .iter()
        .map(|desc| (desc, credentials.contains_key(&desc.id)))
        .collect();

    match session.format {
        OutputFormat::Text => {
            let formatter = session.text();

            println!("{}", formatter.format_carriers_header());
            println!("{}", "─".repeat(70));

            for (desc, configured) in &carriers {
                println!("{}", formatter.format_carrier_line(desc, *configured));
            }

            println!();
            println!(
                "Total: {} carriers ({} with tracking, {} configured)",
                carriers.len(),
                CarrierRegistry::trackable().len(),
                carriers.iter().filter(|(_, configured)| *configured).count()
            );
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format_carriers(&carriers)?),
    }

    Ok(ExitCode::Success)
}
