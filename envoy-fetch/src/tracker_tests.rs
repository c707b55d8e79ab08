//! Orchestrator tests against fake carrier clients.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use envoy_core::{Carrier, Parcel, ParcelData, ParcelEvent, ParcelEventType};

use crate::carrier::{CarrierClient, track_each};
use crate::error::FetchError;
use crate::tracker::{ParcelMerger, Tracker, TrackingBatch};

// ============================================================================
// Fakes
// ============================================================================

/// Returns one event per number, failing the numbers in `fail`.
struct FakeClient {
    carrier: Carrier,
    fail: HashSet<String>,
    auth_error: Option<String>,
    skip: HashSet<String>,
    calls: AtomicUsize,
    seen: std::sync::Mutex<Vec<String>>,
}

impl FakeClient {
    fn new(carrier: Carrier) -> Self {
        Self {
            carrier,
            fail: HashSet::new(),
            auth_error: None,
            skip: HashSet::new(),
            calls: AtomicUsize::new(0),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, tn: &str) -> Self {
        self.fail.insert(tn.to_string());
        self
    }

    fn skipping(mut self, tn: &str) -> Self {
        self.skip.insert(tn.to_string());
        self
    }

    fn rejecting_auth(mut self, message: &str) -> Self {
        self.auth_error = Some(message.to_string());
        self
    }

    fn data_for(tn: &str) -> ParcelData {
        let ts = DateTime::parse_from_rfc3339("2025-02-25T11:48:00-08:00").unwrap();
        ParcelData::from_events(vec![ParcelEvent::new(
            ParcelEventType::Arrived,
            format!("Arrived {tn}"),
            "MEMPHIS, TN",
            ts,
        )])
    }
}

#[async_trait]
impl CarrierClient for FakeClient {
    fn carrier(&self) -> Carrier {
        self.carrier
    }

    async fn authenticate(&self) -> Result<(), FetchError> {
        match &self.auth_error {
            Some(message) => Err(FetchError::AuthenticationFailed(message.clone())),
            None => Ok(()),
        }
    }

    async fn track(&self, tracking_numbers: &[String]) -> Result<Vec<Parcel>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .extend(tracking_numbers.iter().cloned());
        self.authenticate().await?;

        let wanted: Vec<String> = tracking_numbers
            .iter()
            .filter(|tn| !self.skip.contains(*tn))
            .cloned()
            .collect();
        Ok(track_each(self.carrier, &wanted, 2, |tn| async move {
            if self.fail.contains(&tn) {
                Err(FetchError::Status {
                    carrier: self.carrier,
                    status: 500,
                    message: "upstream timeout".into(),
                })
            } else {
                let data = Self::data_for(&tn);
                Ok(Parcel::new(self.carrier, tn).with_data(data))
            }
        })
        .await)
    }
}

fn tracker(clients: Vec<Arc<FakeClient>>) -> Tracker {
    Tracker::with_clients(clients.into_iter().map(|c| c as Arc<dyn CarrierClient>))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_groups_by_carrier_and_merges() {
    let fedex = Arc::new(FakeClient::new(Carrier::FedEx));
    let ups = Arc::new(FakeClient::new(Carrier::UPS));
    let tracker = tracker(vec![Arc::clone(&fedex), Arc::clone(&ups)]);

    let outcome = tracker
        .track_all(&["123456789012", "1Z1234567890123456", "12345678901234567890"])
        .await;

    assert_eq!(outcome.parcels.len(), 3);
    assert!(outcome.is_complete_success());
    assert_eq!(fedex.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ups.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *fedex.seen.lock().unwrap(),
        vec!["123456789012".to_string(), "12345678901234567890".to_string()]
    );
    assert_eq!(*ups.seen.lock().unwrap(), vec!["1Z1234567890123456".to_string()]);
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let numbers: Vec<String> = (0..5).map(|i| format!("12345678901{i}")).collect();
    let fedex = Arc::new(FakeClient::new(Carrier::FedEx).failing(&numbers[3]));
    let tracker = tracker(vec![fedex]);

    let outcome = tracker.track_all(&numbers).await;

    assert_eq!(outcome.parcels.len(), 5);
    let failed: Vec<_> = outcome.failures().map(|p| p.tracking_number.clone()).collect();
    assert_eq!(failed, vec![numbers[3].clone()]);
    assert_eq!(outcome.successes().count(), 4);

    let report = &outcome.batches[0];
    assert_eq!((report.requested, report.succeeded, report.failed), (5, 4, 1));
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_auth_failure_marks_whole_group() {
    let ups = Arc::new(FakeClient::new(Carrier::UPS).rejecting_auth("invalid_client"));
    let fedex = Arc::new(FakeClient::new(Carrier::FedEx));
    let tracker = tracker(vec![ups, fedex]);

    let outcome = tracker
        .track_all(&["1Z1234567890123456", "1Z9999999999999999", "123456789012"])
        .await;

    assert_eq!(outcome.parcels.len(), 3);
    for tn in ["1Z1234567890123456", "1Z9999999999999999"] {
        let parcel = &outcome.parcels[tn];
        assert_eq!(parcel.carrier, Carrier::UPS);
        assert!(parcel.error.as_deref().unwrap().contains("invalid_client"));
    }
    assert!(outcome.parcels["123456789012"].has_data());
}

#[tokio::test]
async fn test_unknown_and_unsupported_are_reported() {
    let tracker = tracker(vec![Arc::new(FakeClient::new(Carrier::FedEx))]);

    let outcome = tracker
        .track_all(&["not a tracking number", "1234567890", "123456789012"])
        .await;

    assert_eq!(outcome.parcels.len(), 3);
    let unknown = &outcome.parcels["NOTATRACKINGNUMBER"];
    assert_eq!(unknown.carrier, Carrier::Unknown);
    assert_eq!(unknown.error.as_deref(), Some("Unable to identify carrier"));

    let dhl = &outcome.parcels["1234567890"];
    assert_eq!(dhl.error.as_deref(), Some("Tracking not supported for DHL"));
    assert!(dhl.tracking_url.is_some());
}

#[tokio::test]
async fn test_skipped_numbers_still_reported() {
    let fedex = Arc::new(FakeClient::new(Carrier::FedEx).skipping("123456789012"));
    let outcome = tracker(vec![fedex])
        .track_all(&["123456789012", "123456789013"])
        .await;

    assert_eq!(outcome.parcels.len(), 2);
    assert_eq!(
        outcome.parcels["123456789012"].error.as_deref(),
        Some("No tracking data returned")
    );
    assert!(outcome.parcels["123456789013"].has_data());
}

#[tokio::test]
async fn test_duplicate_inputs_fetched_once() {
    let fedex = Arc::new(FakeClient::new(Carrier::FedEx));
    let tracker = tracker(vec![Arc::clone(&fedex)]);

    let outcome = tracker
        .track_all(&["1234 5678 9012", "1234-5678-9012", "123456789012"])
        .await;

    assert_eq!(outcome.parcels.len(), 1);
    assert_eq!(fedex.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_qualified_numbers_skip_classification() {
    let usps = Arc::new(FakeClient::new(Carrier::USPS));
    let tracker = tracker(vec![Arc::clone(&usps)]);

    let mut batch = TrackingBatch::new();
    assert!(batch.push_for(Carrier::USPS, "123456789012"));
    assert!(!batch.push_for(Carrier::FedEx, "123456789012"));

    let outcome = tracker.track_batch(batch).await;
    assert_eq!(outcome.parcels["123456789012"].carrier, Carrier::USPS);
}

#[tokio::test]
async fn test_empty_input() {
    let outcome = Tracker::new().track_all::<String>(&[]).await;
    assert!(outcome.parcels.is_empty());
    assert!(outcome.batches.is_empty());
}

#[test]
fn test_merge_key_uniqueness_latest_wins() {
    let mut merger = ParcelMerger::new();
    let first = Parcel::new(Carrier::FedEx, "123456789012").with_data(FakeClient::data_for("a"));
    let second = Parcel::new(Carrier::FedEx, "123456789012").with_data(FakeClient::data_for("b"));

    assert!(merger.merge(first));
    assert!(merger.merge(second));

    let parcels = merger.into_inner();
    assert_eq!(parcels.len(), 1);
    let event = &parcels["123456789012"].data.as_ref().unwrap().events[0];
    assert_eq!(event.description, "Arrived b");
}

#[test]
fn test_merge_discards_empty_parcels() {
    let mut merger = ParcelMerger::new();
    assert!(!merger.merge(Parcel::new(Carrier::UPS, "1Z1234567890123456")));
    assert!(!merger.contains("1Z1234567890123456"));
}
