//! Tracking orchestrator.
//!
//! The tracker classifies input numbers into carrier groups, runs one
//! concurrent task per group, waits for all of them, and merges the results
//! into a single map keyed by tracking number.
//!
//! Every input number appears in the output: numbers for unknown or
//! unsupported carriers, numbers in a batch whose authentication failed, and
//! numbers the carrier silently skipped all come back as parcels carrying an
//! error.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use envoy_core::{Carrier, Parcel, classify, normalize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::carrier::CarrierClient;
use crate::error::FetchError;

// ============================================================================
// Tracking Batch
// ============================================================================

/// Tracking numbers grouped by carrier, each number at most once.
#[derive(Debug, Clone, Default)]
pub struct TrackingBatch {
    groups: BTreeMap<Carrier, Vec<String>>,
    seen: HashSet<String>,
}

impl TrackingBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies and adds every raw number.
    pub fn classified<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = Self::new();
        for raw in numbers {
            batch.push(raw.as_ref());
        }
        batch
    }

    /// Normalizes, classifies, and adds a number.
    ///
    /// Returns the assigned carrier, or `None` if the number was blank or
    /// already present.
    pub fn push(&mut self, raw: &str) -> Option<Carrier> {
        let carrier = classify(raw);
        self.push_for(carrier, raw).then_some(carrier)
    }

    /// Adds a number for a known carrier, skipping classification.
    ///
    /// Returns false if the number was blank or already present.
    pub fn push_for(&mut self, carrier: Carrier, raw: &str) -> bool {
        let tn = normalize(raw);
        if tn.is_empty() || !self.seen.insert(tn.clone()) {
            return false;
        }
        self.groups.entry(carrier).or_default().push(tn);
        true
    }

    /// Returns the carrier groups.
    pub fn groups(&self) -> &BTreeMap<Carrier, Vec<String>> {
        &self.groups
    }

    /// Returns the total number of tracking numbers.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if no numbers were added.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// ============================================================================
// Parcel Merger
// ============================================================================

/// Collects parcels keyed by tracking number.
///
/// The latest merged parcel for a number replaces the earlier one. Parcels
/// with neither data nor an error are discarded.
#[derive(Debug, Default)]
pub struct ParcelMerger {
    parcels: BTreeMap<String, Parcel>,
}

impl ParcelMerger {
    /// Creates an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one parcel. Returns false if it was discarded as empty.
    pub fn merge(&mut self, parcel: Parcel) -> bool {
        if parcel.is_empty() {
            debug!(tracking_number = %parcel.tracking_number, "Discarding empty parcel");
            return false;
        }
        self.parcels.insert(parcel.tracking_number.clone(), parcel);
        true
    }

    /// Merges many parcels, returning how many were kept.
    pub fn merge_all(&mut self, parcels: impl IntoIterator<Item = Parcel>) -> usize {
        parcels
            .into_iter()
            .map(|p| self.merge(p))
            .filter(|kept| *kept)
            .count()
    }

    /// Returns true if a parcel for the number has been merged.
    pub fn contains(&self, tracking_number: &str) -> bool {
        self.parcels.contains_key(tracking_number)
    }

    /// Returns the merged parcels.
    pub fn into_inner(self) -> BTreeMap<String, Parcel> {
        self.parcels
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Record of one carrier batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Carrier of the batch.
    pub carrier: Carrier,
    /// Numbers requested.
    pub requested: usize,
    /// Parcels that came back with data.
    pub succeeded: usize,
    /// Parcels that came back with an error.
    pub failed: usize,
    /// Batch-level error (authentication, unsupported carrier).
    pub error: Option<String>,
    /// How long the batch took.
    pub duration: Duration,
}

/// The outcome of a `track_all` call.
#[derive(Debug, Default)]
pub struct TrackOutcome {
    /// One parcel per distinct input tracking number.
    pub parcels: BTreeMap<String, Parcel>,
    /// One report per carrier group.
    pub batches: Vec<BatchReport>,
    /// Total wall time.
    pub duration: Duration,
}

impl TrackOutcome {
    /// Returns parcels that carry data.
    pub fn successes(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels.values().filter(|p| p.has_data())
    }

    /// Returns parcels that carry an error.
    pub fn failures(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels.values().filter(|p| p.has_error())
    }

    /// Returns true if every parcel carries data.
    pub fn is_complete_success(&self) -> bool {
        self.parcels.values().all(Parcel::has_data)
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// Fans tracking requests out to carrier clients and merges the results.
#[derive(Clone, Default)]
pub struct Tracker {
    clients: HashMap<Carrier, Arc<dyn CarrierClient>>,
}

impl Tracker {
    /// Creates a tracker with no clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker from a list of clients.
    pub fn with_clients(clients: impl IntoIterator<Item = Arc<dyn CarrierClient>>) -> Self {
        let mut tracker = Self::new();
        for client in clients {
            tracker.register(client);
        }
        tracker
    }

    /// Registers a client, replacing any client for the same carrier.
    pub fn register(&mut self, client: Arc<dyn CarrierClient>) {
        self.clients.insert(client.carrier(), client);
    }

    /// Returns true if a client is registered for the carrier.
    pub fn supports(&self, carrier: Carrier) -> bool {
        self.clients.contains_key(&carrier)
    }

    /// Returns the carriers with registered clients.
    pub fn carriers(&self) -> Vec<Carrier> {
        let mut carriers: Vec<_> = self.clients.keys().copied().collect();
        carriers.sort();
        carriers
    }

    /// Classifies and tracks raw tracking numbers.
    pub async fn track_all<S: AsRef<str>>(&self, tracking_numbers: &[S]) -> TrackOutcome {
        self.track_batch(TrackingBatch::classified(tracking_numbers))
            .await
    }

    /// Tracks a pre-grouped batch.
    #[instrument(skip(self, batch), fields(count = batch.len(), groups = batch.groups().len()))]
    pub async fn track_batch(&self, batch: TrackingBatch) -> TrackOutcome {
        let start = Instant::now();
        let mut merger = ParcelMerger::new();
        let mut batches = Vec::new();
        let mut tasks = JoinSet::new();
        let mut pending: BTreeMap<Carrier, Vec<String>> = BTreeMap::new();

        for (carrier, numbers) in batch.groups {
            let Some(client) = self.clients.get(&carrier).cloned() else {
                let error = if carrier == Carrier::Unknown {
                    "Unable to identify carrier".to_string()
                } else {
                    FetchError::UnsupportedCarrier(carrier).to_string()
                };
                warn!(carrier = %carrier, count = numbers.len(), "Skipping unsupported carrier");
                merger.merge_all(
                    numbers
                        .iter()
                        .map(|tn| Parcel::failed(carrier, tn.clone(), error.clone())),
                );
                batches.push(BatchReport {
                    carrier,
                    requested: numbers.len(),
                    succeeded: 0,
                    failed: numbers.len(),
                    error: Some(error),
                    duration: Duration::ZERO,
                });
                continue;
            };

            debug!(carrier = %carrier, client = %client.id(), count = numbers.len(), "Dispatching");
            pending.insert(carrier, numbers.clone());
            tasks.spawn(async move {
                let started = Instant::now();
                let result = client.track(&numbers).await;
                (carrier, result, started.elapsed())
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let Ok((carrier, result, duration)) = joined else {
                // Panicked tasks are picked up from `pending` below.
                continue;
            };
            let numbers = pending.remove(&carrier).unwrap_or_default();
            batches.push(Self::merge_result(&mut merger, carrier, &numbers, result, duration));
        }

        for (carrier, numbers) in pending {
            warn!(carrier = %carrier, "Tracking task aborted");
            let error = format!("{carrier} tracking task aborted");
            merger.merge_all(
                numbers
                    .iter()
                    .map(|tn| Parcel::failed(carrier, tn.clone(), error.clone())),
            );
            batches.push(BatchReport {
                carrier,
                requested: numbers.len(),
                succeeded: 0,
                failed: numbers.len(),
                error: Some(error),
                duration: start.elapsed(),
            });
        }

        let outcome = TrackOutcome {
            parcels: merger.into_inner(),
            batches,
            duration: start.elapsed(),
        };
        info!(
            parcels = outcome.parcels.len(),
            failed = outcome.failures().count(),
            duration = ?outcome.duration,
            "Tracking complete"
        );
        outcome
    }

    /// Folds one carrier batch into the merger and reports on it.
    fn merge_result(
        merger: &mut ParcelMerger,
        carrier: Carrier,
        numbers: &[String],
        result: Result<Vec<Parcel>, FetchError>,
        duration: Duration,
    ) -> BatchReport {
        match result {
            Ok(parcels) => {
                let succeeded = parcels.iter().filter(|p| p.has_data()).count();
                let mut failed = parcels.iter().filter(|p| p.has_error()).count();
                merger.merge_all(parcels);

                let missing: Vec<String> = numbers
                    .iter()
                    .filter(|tn| !merger.contains(tn))
                    .cloned()
                    .collect();
                for tn in missing {
                    warn!(carrier = %carrier, tracking_number = %tn, "No result returned");
                    merger.merge(Parcel::failed(carrier, tn, "No tracking data returned"));
                    failed += 1;
                }

                info!(carrier = %carrier, succeeded, failed, duration = ?duration, "Batch complete");
                BatchReport {
                    carrier,
                    requested: numbers.len(),
                    succeeded,
                    failed,
                    error: None,
                    duration,
                }
            }
            Err(error) => {
                warn!(carrier = %carrier, error = %error, "Batch failed");
                let message = error.to_string();
                merger.merge_all(
                    numbers
                        .iter()
                        .map(|tn| Parcel::failed(carrier, tn.clone(), message.clone())),
                );
                BatchReport {
                    carrier,
                    requested: numbers.len(),
                    succeeded: 0,
                    failed: numbers.len(),
                    error: Some(message),
                    duration,
                }
            }
        }
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("carriers", &self.carriers())
            .finish()
    }
}
