//! Stored parcel commands - add, list, remove, rename.

use anyhow::{Context, Result};
use clap::Args;
use envoy_core::{Parcel, ParcelStore, normalize};
use envoy_store::{JsonParcelStore, OutputFormat, StoreError};
use tracing::{info, warn};

use super::Session;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Tracking numbers to store.
    pub tracking_numbers: Vec<String>,

    /// Display name; only used when a single number is added.
    #[arg(long, short)]
    pub name: Option<String>,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Tracking numbers to remove.
    #[arg(required = true)]
    pub tracking_numbers: Vec<String>,
}

/// Arguments for the rename command.
#[derive(Args)]
pub struct RenameArgs {
    /// Tracking number of the stored parcel.
    pub tracking_number: String,

    /// New name. An empty name resets it to the tracking number.
    pub name: String,
}

/// Runs the add command.
pub fn add(args: &AddArgs, cli: &Cli) -> Result<ExitCode> {
    let batch = cli.tracking_batch(&args.tracking_numbers);
    if batch.is_empty() {
        anyhow::bail!("No tracking numbers given");
    }

    let name = match (&args.name, batch.len()) {
        (Some(name), 1) => Some(name.as_str()),
        (Some(_), n) => {
            warn!(count = n, "--name ignored when adding several numbers");
            None
        }
        (None, _) => None,
    };

    let session = Session::load(cli)?;
    let store = session.open_store()?;

    let parcels: Vec<Parcel> = batch
        .groups()
        .iter()
        .flat_map(|(carrier, numbers)| numbers.iter().map(|tn| Parcel::new(*carrier, tn.clone())))
        .map(|p| match name {
            Some(name) => p.with_name(name),
            None => p,
        })
        .collect();

    store
        .upsert_all(&parcels)
        .context("Failed to save parcels")?;
    info!(count = parcels.len(), "Added parcels");

    let stored = stored_versions(&store, &parcels)?;
    match session.format {
        OutputFormat::Text => {
            for parcel in &stored {
                println!("Added {} ({}) {}", parcel.tracking_number, parcel.carrier, parcel.name);
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format_parcels(&stored)?),
    }

    Ok(ExitCode::Success)
}

/// Runs the list command.
pub fn list(cli: &Cli) -> Result<ExitCode> {
    let session = Session::load(cli)?;
    let store = session.open_store()?;
    let parcels = store.all().context("Failed to read parcel database")?;

    match session.format {
        OutputFormat::Text => {
            if parcels.is_empty() && !cli.quiet {
                eprintln!("No parcels stored. Add one with `envoy add <TRACKING_NUMBER>`.");
            }
            let formatter = session.text();
            for parcel in &parcels {
                println!("{}", formatter.format_list_line(parcel));
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format_parcels(&parcels)?),
    }

    Ok(ExitCode::Success)
}

/// Runs the remove command.
pub fn remove(args: &RemoveArgs, cli: &Cli) -> Result<ExitCode> {
    let session = Session::load(cli)?;
    let store = session.open_store()?;

    let mut code = ExitCode::Success;
    for raw in &args.tracking_numbers {
        let tracking_number = normalize(raw);
        if remove_one(&store, &tracking_number)? {
            info!(%tracking_number, "Removed parcel");
            if !cli.quiet {
                println!("Removed {tracking_number}");
            }
        } else {
            eprintln!("Not found: {tracking_number}");
            code = ExitCode::NotFound;
        }
    }

    Ok(code)
}

fn remove_one(store: &JsonParcelStore, tracking_number: &str) -> Result<bool> {
    let Some(parcel) = store.get(tracking_number)? else {
        return Ok(false);
    };
    store
        .delete(&parcel)
        .with_context(|| format!("Failed to remove {tracking_number}"))
}

/// Runs the rename command.
pub fn rename(args: &RenameArgs, cli: &Cli) -> Result<ExitCode> {
    let session = Session::load(cli)?;
    let store = session.open_store()?;
    let tracking_number = normalize(&args.tracking_number);

    match store.rename(&tracking_number, &args.name) {
        Ok(parcel) => {
            if !cli.quiet {
                println!("Renamed {tracking_number} to {}", parcel.name);
            }
            Ok(ExitCode::Success)
        }
        Err(StoreError::NotFound(tn)) => {
            eprintln!("Not found: {tn}");
            Ok(ExitCode::NotFound)
        }
        Err(e) => Err(e).context("Failed to rename parcel"),
    }
}

fn stored_versions(store: &JsonParcelStore, parcels: &[Parcel]) -> Result<Vec<Parcel>> {
    parcels
        .iter()
        .map(|p| Ok(store.get(&p.tracking_number)?.unwrap_or_else(|| p.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use envoy_core::{Carrier, ParcelData};

    #[test]
    fn test_remove_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonParcelStore::open(dir.path().join("parcels.json")).unwrap();
        store.upsert(&Parcel::new(Carrier::UPS, "1Z5338FF0107231059")).unwrap();

        assert!(remove_one(&store, "1Z5338FF0107231059").unwrap());
        assert!(!remove_one(&store, "1Z5338FF0107231059").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_readding_keeps_data_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonParcelStore::open(dir.path().join("parcels.json")).unwrap();
        let tracked = Parcel::new(Carrier::FedEx, "441259201412")
            .with_name("Lamp")
            .with_data(ParcelData::default());
        store.upsert(&tracked).unwrap();

        let again = vec![Parcel::new(Carrier::FedEx, "441259201412")];
        store.upsert_all(&again).unwrap();

        let stored = stored_versions(&store, &again).unwrap();
        assert_eq!(stored[0].name, "Lamp");
        assert!(stored[0].has_data());
    }
}
