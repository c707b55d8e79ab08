//! Track and sync commands - fetch tracking data and store it.

use anyhow::{Context, Result};
use clap::Args;
use envoy_core::{Parcel, ParcelStore};
use envoy_fetch::{TrackOutcome, TrackingBatch};
use envoy_store::JsonParcelStore;
use tracing::{debug, info, warn};

use super::Session;
use crate::{Cli, ExitCode};

/// Arguments for the track command.
#[derive(Args, Default)]
pub struct TrackArgs {
    /// Tracking numbers; the carrier is inferred from each number's format.
    pub tracking_numbers: Vec<String>,
}

/// Runs the track command.
pub async fn run(args: &TrackArgs, cli: &Cli) -> Result<ExitCode> {
    let batch = cli.tracking_batch(&args.tracking_numbers);
    if batch.is_empty() {
        anyhow::bail!("No tracking numbers given");
    }

    let session = Session::load(cli)?;
    let store = session.open_store()?;
    track_and_store(&session, &store, batch).await
}

/// Runs the sync command.
pub async fn sync(cli: &Cli) -> Result<ExitCode> {
    let session = Session::load(cli)?;
    let store = session.open_store()?;

    let stored = store.all().context("Failed to read parcel database")?;
    let batch = sync_batch(&stored);
    if batch.is_empty() {
        info!("Nothing to sync");
        if !cli.quiet {
            eprintln!("No trackable parcels stored");
        }
        return Ok(ExitCode::Success);
    }

    track_and_store(&session, &store, batch).await
}

async fn track_and_store(
    session: &Session,
    store: &JsonParcelStore,
    batch: TrackingBatch,
) -> Result<ExitCode> {
    let tracker = session.tracker()?;
    let outcome = tracker.track_batch(batch).await;

    for report in &outcome.batches {
        if let Some(error) = &report.error {
            warn!(carrier = %report.carrier, %error, "Carrier batch failed");
        }
    }
    info!(
        parcels = outcome.parcels.len(),
        failed = outcome.failures().count(),
        duration_ms = outcome.duration.as_millis(),
        "Tracking finished"
    );

    let parcels = record_outcome(store, &outcome)?;
    session.print_histories(&parcels)?;

    Ok(if outcome.is_complete_success() {
        ExitCode::Success
    } else {
        ExitCode::TrackingFailed
    })
}

/// Groups stored parcels by their recorded carrier.
///
/// Parcels without a tracking API are skipped.
fn sync_batch(parcels: &[Parcel]) -> TrackingBatch {
    let mut batch = TrackingBatch::new();
    for parcel in parcels {
        if parcel.carrier.is_trackable() {
            batch.push_for(parcel.carrier, &parcel.tracking_number);
        } else {
            debug!(tracking_number = %parcel.tracking_number, carrier = %parcel.carrier, "Skipping untrackable parcel");
        }
    }
    batch
}

/// Upserts every tracked parcel and returns the stored versions.
///
/// The stored version carries the user's name and any data kept across a
/// failed fetch.
fn record_outcome(store: &JsonParcelStore, outcome: &TrackOutcome) -> Result<Vec<Parcel>> {
    store
        .upsert_all(outcome.parcels.values())
        .context("Failed to save tracking results")?;

    let mut stored = Vec::with_capacity(outcome.parcels.len());
    for (tracking_number, fetched) in &outcome.parcels {
        let parcel = store
            .get(tracking_number)
            .context("Failed to read parcel database")?
            .unwrap_or_else(|| fetched.clone());
        stored.push(parcel);
    }
    Ok(stored)
}
