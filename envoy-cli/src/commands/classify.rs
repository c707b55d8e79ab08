//! Classify command - name the carrier of tracking numbers offline.

use anyhow::Result;
use clap::Args;
use envoy_core::{classify_detailed, normalize};
use envoy_store::OutputFormat;

use super::use_colors;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Tracking numbers to classify.
    #[arg(required = true)]
    pub tracking_numbers: Vec<String>,
}

/// Runs the classify command.
///
/// Reads no configuration; `--format` alone picks the output.
pub fn run(args: &ClassifyArgs, cli: &Cli) -> Result<ExitCode> {
    let items: Vec<_> = args
        .tracking_numbers
        .iter()
        .map(|raw| (normalize(raw), classify_detailed(raw)))
        .filter(|(tn, _)| !tn.is_empty())
        .collect();

    match cli.format.unwrap_or_default() {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(use_colors(cli));
            for (tn, classification) in &items {
                println!("{}", formatter.format_classification(tn, classification));
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format_classifications(&items)?),
    }

    Ok(ExitCode::Success)
}
