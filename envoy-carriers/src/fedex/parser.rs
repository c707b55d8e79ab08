//! FedEx tracking response parser.
//!
//! The Track API nests results three deep: `output.completeTrackResults[]`
//! holds one entry per requested number, each with `trackResults[]` (one per
//! piece), each with its own `scanEvents[]`. Pieces of one number are folded
//! into a single [`ParcelData`].

use envoy_core::{Location, ParcelData, ParcelEvent, ParcelEventType};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::FedexError;
use crate::common::parse_timestamp;

/// `dateAndTimes` types that project a future delivery.
const PROJECTION_TYPES: &[&str] = &["ESTIMATED_DELIVERY", "COMMITMENT", "APPOINTMENT_DELIVERY"];

// ============================================================================
// Wire Types
// ============================================================================

/// Top-level Track API response.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingResponse {
    /// Transaction id echoed by FedEx.
    pub transaction_id: Option<String>,
    /// Response payload.
    pub output: Option<TrackingOutput>,
}

/// Response payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingOutput {
    /// One entry per requested tracking number.
    pub complete_track_results: Vec<CompleteTrackResult>,
}

/// Results for one requested tracking number.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompleteTrackResult {
    /// The tracking number as FedEx echoes it.
    pub tracking_number: String,
    /// One result per piece.
    pub track_results: Vec<TrackResult>,
}

/// Tracking detail for one piece.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackResult {
    /// Most recent status.
    #[serde(alias = "lastStatusDetail")]
    pub latest_status_detail: Option<StatusDetail>,
    /// Dated milestones, including projections.
    pub date_and_times: Vec<DateAndTime>,
    /// Scan history.
    pub scan_events: Vec<ScanEvent>,
    /// Set when FedEx could not track this piece.
    pub error: Option<ApiError>,
}

/// Status summary.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusDetail {
    /// Status code (e.g., `DL`).
    pub code: String,
    /// Derived status code.
    pub derived_code: String,
    /// Status description.
    pub description: String,
}

/// A FedEx address.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    /// City.
    pub city: Option<String>,
    /// State or province code.
    pub state_or_province_code: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// ISO country code.
    pub country_code: Option<String>,
}

impl Address {
    /// Renders the address as an event location.
    pub fn to_location(&self) -> Location {
        Location::new(
            self.city.as_deref(),
            self.state_or_province_code.as_deref(),
            self.postal_code.as_deref(),
            self.country_code.as_deref(),
        )
    }
}

/// A typed date, e.g. `ESTIMATED_DELIVERY`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateAndTime {
    /// Milestone type.
    #[serde(rename = "type")]
    pub kind: String,
    /// RFC 3339 or naive timestamp.
    pub date_time: String,
}

/// One scan.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanEvent {
    /// RFC 3339 or naive timestamp.
    pub date: String,
    /// Scan type code (e.g., `AR`).
    pub event_type: String,
    /// Scan description.
    pub event_description: String,
    /// Exception text, if the scan is an exception.
    pub exception_description: String,
    /// Derived status code, used when `event_type` is unmapped.
    pub derived_status_code: String,
    /// Where the scan happened.
    pub scan_location: Option<Address>,
}

/// Error attached to a track result.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiError {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

// ============================================================================
// Event Mapping
// ============================================================================

/// Maps a FedEx scan or status code to an event type.
pub fn event_type(code: &str) -> ParcelEventType {
    match code.trim().to_ascii_uppercase().as_str() {
        "OC" => ParcelEventType::OrderConfirmed,
        "PU" => ParcelEventType::PickedUp,
        "AO" => ParcelEventType::ExpectedOnTime,
        "DP" => ParcelEventType::Departed,
        "AR" | "AF" => ParcelEventType::Arrived,
        "IT" => ParcelEventType::Processing,
        "OD" => ParcelEventType::OutForDelivery,
        "DL" => ParcelEventType::Delivered,
        "DE" | "SE" | "DY" => ParcelEventType::Delayed,
        "HL" => ParcelEventType::AwaitingCustomerPickup,
        "CA" => ParcelEventType::Undeliverable,
        "RS" => ParcelEventType::ReturnedToSender,
        _ => ParcelEventType::Unknown,
    }
}

impl ScanEvent {
    /// Event type from `event_type`, falling back to `derived_status_code`.
    pub fn parcel_event_type(&self) -> ParcelEventType {
        match event_type(&self.event_type) {
            ParcelEventType::Unknown => event_type(&self.derived_status_code),
            mapped => mapped,
        }
    }

    /// Converts the scan into a normalized event.
    ///
    /// Returns `None` if the timestamp cannot be parsed.
    pub fn to_event(&self) -> Option<ParcelEvent> {
        let Some(timestamp) = parse_timestamp(&self.date) else {
            warn!(date = %self.date, "Skipping FedEx scan with unparsable date");
            return None;
        };

        let event_type = self.parcel_event_type();
        let description = [&self.event_description, &self.exception_description]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| event_type.label());
        let location = self
            .scan_location
            .as_ref()
            .map(|a| a.to_location().to_string())
            .unwrap_or_default();

        Some(ParcelEvent::new(event_type, description, location, timestamp))
    }
}

impl StatusDetail {
    fn is_delivered(&self) -> bool {
        event_type(&self.code).is_delivered() || event_type(&self.derived_code).is_delivered()
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Folds the track results of one number into normalized data.
pub fn normalize(results: &[&TrackResult]) -> ParcelData {
    let events = results
        .iter()
        .flat_map(|r| r.scan_events.iter())
        .filter_map(ScanEvent::to_event)
        .collect();

    let mut data = ParcelData::from_events(events);
    data.delivered |= results
        .iter()
        .filter_map(|r| r.latest_status_detail.as_ref())
        .any(StatusDetail::is_delivered);
    data.delivery_projection = results
        .iter()
        .flat_map(|r| r.date_and_times.iter())
        .filter(|d| PROJECTION_TYPES.contains(&d.kind.as_str()))
        .filter_map(|d| parse_timestamp(&d.date_time))
        .max();
    data
}

/// Parses a Track API response body for one tracking number.
///
/// A result whose every piece carries an error and no scans becomes a
/// [`FedexError::Tracking`].
pub fn parse_tracking_response(tracking_number: &str, body: &str) -> Result<ParcelData, FedexError> {
    debug!(len = body.len(), "Parsing FedEx response");

    let response: TrackingResponse = serde_json::from_str(body)
        .map_err(|e| FedexError::InvalidResponse(format!("Invalid JSON: {e}")))?;

    let results = response
        .output
        .map(|o| o.complete_track_results)
        .unwrap_or_default();
    let complete = results
        .iter()
        .find(|r| r.tracking_number.eq_ignore_ascii_case(tracking_number))
        .or_else(|| results.first().filter(|_| results.len() == 1))
        .ok_or_else(|| FedexError::MissingResult(tracking_number.to_string()))?;

    let (failed, tracked): (Vec<&TrackResult>, Vec<&TrackResult>) = complete
        .track_results
        .iter()
        .partition(|r| r.error.is_some() && r.scan_events.is_empty());

    if tracked.is_empty() {
        let error = failed
            .iter()
            .find_map(|r| r.error.as_ref())
            .ok_or_else(|| FedexError::MissingResult(tracking_number.to_string()))?;
        return Err(FedexError::Tracking {
            code: error.code.clone(),
            message: error.message.clone(),
        });
    }

    Ok(normalize(&tracked))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DELIVERED: &str = r#"{
        "transactionId": "624deea6-b709-470c-8c39-4b5511281492",
        "output": {
            "completeTrackResults": [{
                "trackingNumber": "441259201412",
                "trackResults": [{
                    "trackingNumberInfo": {"trackingNumber": "441259201412", "carrierCode": "FDXE"},
                    "latestStatusDetail": {"code": "DL", "derivedCode": "DL", "description": "Delivered"},
                    "dateAndTimes": [
                        {"type": "ACTUAL_DELIVERY", "dateTime": "2025-02-28T10:15:00-05:00"},
                        {"type": "ESTIMATED_DELIVERY", "dateTime": "2025-02-27T20:00:00-05:00"},
                        {"type": "COMMITMENT", "dateTime": "2025-02-28T20:00:00-05:00"},
                        {"type": "SHIP", "dateTime": "2025-02-25T00:00:00-06:00"}
                    ],
                    "scanEvents": [
                        {
                            "date": "2025-02-28T10:15:00-05:00",
                            "eventType": "DL",
                            "eventDescription": "Delivered",
                            "derivedStatusCode": "DL",
                            "scanLocation": {"city": "Brooklyn", "stateOrProvinceCode": "NY", "postalCode": "11201", "countryCode": "US"}
                        },
                        {
                            "date": "2025-02-26T03:02:00-06:00",
                            "eventType": "XX",
                            "eventDescription": "In transit",
                            "derivedStatusCode": "IT",
                            "scanLocation": {"city": "Memphis", "stateOrProvinceCode": "TN", "countryCode": "US"}
                        },
                        {
                            "date": "2025-02-25T11:48:00-08:00",
                            "eventType": "OC",
                            "eventDescription": "Shipment information sent to FedEx",
                            "scanLocation": {"city": "Altoona", "stateOrProvinceCode": "PA", "countryCode": "US"}
                        }
                    ]
                }]
            }]
        }
    }"#;

    const NOT_FOUND: &str = r#"{
        "output": {
            "completeTrackResults": [{
                "trackingNumber": "123456789012",
                "trackResults": [{
                    "error": {
                        "code": "TRACKING.TRACKINGNUMBER.NOTFOUND",
                        "message": "Tracking number cannot be found. Please correct the tracking number and try again."
                    }
                }]
            }]
        }
    }"#;

    #[test]
    fn test_parse_delivered_response() {
        let data = parse_tracking_response("441259201412", DELIVERED).unwrap();

        assert_eq!(data.events.len(), 3);
        assert!(data.delivered);

        let last = data.last_event().unwrap();
        assert_eq!(last.event_type, ParcelEventType::Delivered);
        assert_eq!(last.location, "BROOKLYN, NY 11201");

        let first = data.chronological()[0];
        assert_eq!(first.event_type, ParcelEventType::OrderConfirmed);
        assert_eq!(first.description, "Shipment information sent to FedEx");
        assert_eq!(first.location, "ALTOONA, PA");
    }

    #[test]
    fn test_derived_code_fallback() {
        let data = parse_tracking_response("441259201412", DELIVERED).unwrap();
        let transit = data
            .events
            .iter()
            .find(|e| e.description == "In transit")
            .unwrap();
        assert_eq!(transit.event_type, ParcelEventType::Processing);
    }

    #[test]
    fn test_projection_excludes_actual_delivery() {
        let data = parse_tracking_response("441259201412", DELIVERED).unwrap();
        let projection = data.delivery_projection.unwrap();
        assert_eq!(projection.to_rfc3339(), "2025-02-28T20:00:00-05:00");
    }

    #[test]
    fn test_not_found_becomes_error() {
        let err = parse_tracking_response("123456789012", NOT_FOUND).unwrap_err();
        match err {
            FedexError::Tracking { code, message } => {
                assert_eq!(code, "TRACKING.TRACKINGNUMBER.NOTFOUND");
                assert!(message.starts_with("Tracking number cannot be found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_naive_scan_dates_parse_as_utc() {
        let body = r#"{"output": {"completeTrackResults": [{
            "trackingNumber": "123456789012",
            "trackResults": [{"scanEvents": [{"date": "2025-02-25T11:48:00", "eventType": "PU"}]}]
        }]}}"#;
        let data = parse_tracking_response("123456789012", body).unwrap();
        let event = &data.events[0];
        assert_eq!(event.timestamp.to_rfc3339(), "2025-02-25T11:48:00+00:00");
        assert_eq!(event.event_type, ParcelEventType::PickedUp);
        assert_eq!(event.description, "PICKED UP");
        assert_eq!(event.location, "");
    }

    #[test]
    fn test_latest_status_marks_delivered() {
        let body = r#"{"output": {"completeTrackResults": [{
            "trackingNumber": "123456789012",
            "trackResults": [{
                "latestStatusDetail": {"code": "DL"},
                "scanEvents": [{"date": "2025-02-25T11:48:00Z", "eventType": "AR"}]
            }]
        }]}}"#;
        let data = parse_tracking_response("123456789012", body).unwrap();
        assert!(data.delivered);
    }

    #[test]
    fn test_unparsable_scan_is_skipped() {
        let body = r#"{"output": {"completeTrackResults": [{
            "trackingNumber": "123456789012",
            "trackResults": [{"scanEvents": [
                {"date": "not a date", "eventType": "AR"},
                {"date": "2025-02-25T11:48:00Z", "eventType": "DP"}
            ]}]
        }]}}"#;
        let data = parse_tracking_response("123456789012", body).unwrap();
        assert_eq!(data.events.len(), 1);
        assert_eq!(data.events[0].event_type, ParcelEventType::Departed);
    }

    #[test]
    fn test_missing_result() {
        let body = r#"{"output": {"completeTrackResults": []}}"#;
        assert!(matches!(
            parse_tracking_response("123456789012", body),
            Err(FedexError::MissingResult(_))
        ));
    }

    #[test]
    fn test_event_code_map() {
        assert_eq!(event_type("oc"), ParcelEventType::OrderConfirmed);
        assert_eq!(event_type("AF"), ParcelEventType::Arrived);
        assert_eq!(event_type("SE"), ParcelEventType::Delayed);
        assert_eq!(event_type("HL"), ParcelEventType::AwaitingCustomerPickup);
        assert_eq!(event_type("CA"), ParcelEventType::Undeliverable);
        assert_eq!(event_type("RS"), ParcelEventType::ReturnedToSender);
        assert_eq!(event_type("ZZ"), ParcelEventType::Unknown);
        assert_eq!(event_type(""), ParcelEventType::Unknown);
    }
}
