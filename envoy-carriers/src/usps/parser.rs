//! USPS tracking response parser.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use envoy_core::{Location, ParcelData, ParcelEvent, ParcelEventType};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::UspsError;
use crate::common::{bool_or_string, parse_offset, parse_timestamp, parse_timestamp_in};

/// Keywords matched against the uppercased event type, first match wins.
const EVENT_KEYWORDS: &[(&str, ParcelEventType)] = &[
    ("DELIVERED", ParcelEventType::Delivered),
    ("OUT FOR DELIVERY", ParcelEventType::OutForDelivery),
    ("ARRIVED", ParcelEventType::Arrived),
    ("DEPARTED", ParcelEventType::Departed),
    ("PROCESSED", ParcelEventType::Processing),
    ("IN TRANSIT", ParcelEventType::Processing),
    ("PRE-SHIPMENT", ParcelEventType::OrderConfirmed),
    ("SHIPPING LABEL CREATED", ParcelEventType::OrderConfirmed),
    ("ACCEPTED", ParcelEventType::PickedUp),
    ("PICKED UP", ParcelEventType::PickedUp),
    ("AVAILABLE FOR PICKUP", ParcelEventType::AwaitingCustomerPickup),
    ("HELD AT POST OFFICE", ParcelEventType::AwaitingCustomerPickup),
    ("NOTICE LEFT", ParcelEventType::AwaitingCustomerAction),
    ("UNDELIVERABLE", ParcelEventType::Undeliverable),
    ("RETURN TO SENDER", ParcelEventType::ReturnedToSender),
    ("DELAY", ParcelEventType::Delayed),
];

/// Event codes that always mean delivery.
const DELIVERED_CODES: &[&str] = &["01", "DL"];

// ============================================================================
// Wire Types
// ============================================================================

/// Tracking v3 response with `expand=DETAIL`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingResponse {
    /// Tracking number.
    pub tracking_number: String,
    /// Coarse status (e.g., `Delivered`, `In Transit`).
    pub status_category: String,
    /// Latest status text.
    pub status: String,
    /// Sentence describing the latest status.
    pub status_summary: String,
    /// Expected delivery, when USPS has committed to one.
    pub expected_delivery_timestamp: Option<String>,
    /// Predicted delivery date.
    pub predicted_delivery_date: Option<String>,
    /// Event history, newest first.
    pub tracking_events: Vec<TrackingEvent>,
}

/// One tracking event.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingEvent {
    /// Event text (e.g., `Delivered, In/At Mailbox`).
    pub event_type: String,
    /// Local time without offset.
    pub event_timestamp: String,
    /// UTC time.
    #[serde(rename = "GMTTimestamp")]
    pub gmt_timestamp: Option<String>,
    /// Facility offset from UTC.
    #[serde(rename = "GMTOffset")]
    pub gmt_offset: Option<String>,
    /// Country.
    pub event_country: Option<String>,
    /// City.
    pub event_city: Option<String>,
    /// State.
    pub event_state: Option<String>,
    /// ZIP code.
    #[serde(rename = "eventZIP")]
    pub event_zip: Option<String>,
    /// Firm name for business deliveries.
    pub firm: Option<String>,
    /// Recipient name.
    pub name: Option<String>,
    /// Whether an authorized agent signed.
    #[serde(deserialize_with = "bool_or_string")]
    pub authorized_agent: bool,
    /// Two-character event code.
    pub event_code: String,
}

// ============================================================================
// Event Mapping
// ============================================================================

/// Maps a USPS event text and code to an event type.
pub fn event_type(text: &str, code: &str) -> ParcelEventType {
    let code = code.trim().to_ascii_uppercase();
    if DELIVERED_CODES.contains(&code.as_str()) {
        return ParcelEventType::Delivered;
    }

    let text = text.to_uppercase();
    EVENT_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map_or(ParcelEventType::Unknown, |(_, event_type)| *event_type)
}

impl TrackingEvent {
    /// Event time, preferring the GMT timestamp shifted to the facility offset.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let offset = self.gmt_offset.as_deref().and_then(parse_offset);

        let gmt = self
            .gmt_timestamp
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(parse_timestamp);
        if let Some(gmt) = gmt {
            return Some(gmt.with_timezone(&offset.unwrap_or_else(|| gmt.offset().fix())));
        }

        parse_timestamp_in(&self.event_timestamp, offset.unwrap_or_else(|| Utc.fix()))
    }

    fn location(&self) -> Location {
        Location::new(
            self.event_city.as_deref(),
            self.event_state.as_deref(),
            self.event_zip.as_deref(),
            self.event_country.as_deref(),
        )
    }

    /// Converts the event into a normalized event.
    ///
    /// Returns `None` if no timestamp can be parsed.
    pub fn to_event(&self) -> Option<ParcelEvent> {
        let Some(timestamp) = self.timestamp() else {
            warn!(timestamp = %self.event_timestamp, "Skipping USPS event with unparsable date");
            return None;
        };

        let event_type = event_type(&self.event_type, &self.event_code);
        let description = match self.event_type.trim() {
            "" => event_type.label(),
            text => text,
        };

        Some(ParcelEvent::new(
            event_type,
            description,
            self.location().to_string(),
            timestamp,
        ))
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalizes a decoded response.
pub fn normalize(response: &TrackingResponse) -> ParcelData {
    let events = response
        .tracking_events
        .iter()
        .filter_map(TrackingEvent::to_event)
        .collect();

    let mut data = ParcelData::from_events(events);
    data.delivered |= response
        .status_category
        .trim()
        .eq_ignore_ascii_case("DELIVERED");
    data.delivery_projection = response
        .expected_delivery_timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| {
            response
                .predicted_delivery_date
                .as_deref()
                .and_then(parse_timestamp)
        });
    data
}

/// Parses a tracking response body.
pub fn parse_tracking_response(body: &str) -> Result<ParcelData, UspsError> {
    debug!(len = body.len(), "Parsing USPS response");

    let response: TrackingResponse = serde_json::from_str(body)
        .map_err(|e| UspsError::InvalidResponse(format!("Invalid JSON: {e}")))?;
    Ok(normalize(&response))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DELIVERED: &str = r#"{
        "trackingNumber": "9400111899223344556677",
        "statusCategory": "Delivered",
        "status": "Delivered, In/At Mailbox",
        "statusSummary": "Your item was delivered in or at the mailbox at 1:22 pm on March 5, 2025 in DENVER, CO 80202.",
        "expectedDeliveryTimestamp": "2025-03-05T20:00:00-07:00",
        "trackingEvents": [
            {
                "eventType": "Delivered, In/At Mailbox",
                "eventTimestamp": "2025-03-05T13:22:00",
                "GMTTimestamp": "2025-03-05T20:22:00Z",
                "GMTOffset": "-07:00",
                "eventCountry": null,
                "eventCity": "DENVER",
                "eventState": "CO",
                "eventZIP": "80202",
                "firm": null,
                "name": null,
                "authorizedAgent": "false",
                "eventCode": "01"
            },
            {
                "eventType": "Out for Delivery",
                "eventTimestamp": "2025-03-05T07:10:00",
                "GMTOffset": "-07:00",
                "eventCity": "DENVER",
                "eventState": "CO",
                "eventZIP": "80202",
                "authorizedAgent": false,
                "eventCode": "OF"
            },
            {
                "eventType": "Shipping Label Created, USPS Awaiting Item",
                "eventTimestamp": "2025-03-02T18:40:00",
                "eventCity": "BROOKLYN",
                "eventState": "NY",
                "eventZIP": "11201",
                "eventCode": "GX"
            }
        ]
    }"#;

    #[test]
    fn test_parse_delivered_response() {
        let data = parse_tracking_response(DELIVERED).unwrap();

        assert_eq!(data.events.len(), 3);
        assert!(data.delivered);

        let last = data.last_event().unwrap();
        assert_eq!(last.event_type, ParcelEventType::Delivered);
        assert_eq!(last.description, "Delivered, In/At Mailbox");
        assert_eq!(last.location, "DENVER, CO 80202");
        assert_eq!(last.timestamp.to_rfc3339(), "2025-03-05T13:22:00-07:00");

        let first = data.chronological()[0];
        assert_eq!(first.event_type, ParcelEventType::OrderConfirmed);
        assert_eq!(first.timestamp.to_rfc3339(), "2025-03-02T18:40:00+00:00");
    }

    #[test]
    fn test_local_timestamp_uses_offset() {
        let data = parse_tracking_response(DELIVERED).unwrap();
        let out = data
            .events
            .iter()
            .find(|e| e.event_type == ParcelEventType::OutForDelivery)
            .unwrap();
        assert_eq!(out.timestamp.to_rfc3339(), "2025-03-05T07:10:00-07:00");
    }

    #[test]
    fn test_projection_prefers_expected_timestamp() {
        let data = parse_tracking_response(DELIVERED).unwrap();
        assert_eq!(
            data.delivery_projection.unwrap().to_rfc3339(),
            "2025-03-05T20:00:00-07:00"
        );

        let body = r#"{"predictedDeliveryDate": "2025-03-07", "trackingEvents": []}"#;
        let data = parse_tracking_response(body).unwrap();
        assert_eq!(
            data.delivery_projection.unwrap().to_rfc3339(),
            "2025-03-07T00:00:00+00:00"
        );
        assert!(!data.delivered);
    }

    #[test]
    fn test_status_category_marks_delivered() {
        let body = r#"{"statusCategory": "DELIVERED", "trackingEvents": [
            {"eventType": "Arrived at Post Office", "eventTimestamp": "2025-03-05T06:00:00"}
        ]}"#;
        let data = parse_tracking_response(body).unwrap();
        assert!(data.delivered);
        assert_eq!(data.events[0].event_type, ParcelEventType::Arrived);
    }

    #[test]
    fn test_authorized_agent_accepts_strings() {
        let event: TrackingEvent =
            serde_json::from_str(r#"{"authorizedAgent": "true"}"#).unwrap();
        assert!(event.authorized_agent);
        let event: TrackingEvent = serde_json::from_str(r#"{"authorizedAgent": true}"#).unwrap();
        assert!(event.authorized_agent);
        let event: TrackingEvent = serde_json::from_str("{}").unwrap();
        assert!(!event.authorized_agent);
    }

    #[test]
    fn test_keyword_order() {
        assert_eq!(
            event_type("Delivered, Front Door/Porch", ""),
            ParcelEventType::Delivered
        );
        assert_eq!(
            event_type("Arrived at USPS Regional Facility", ""),
            ParcelEventType::Arrived
        );
        assert_eq!(
            event_type("In Transit to Next Facility", ""),
            ParcelEventType::Processing
        );
        assert_eq!(
            event_type("USPS in possession of item", ""),
            ParcelEventType::Unknown
        );
        assert_eq!(
            event_type("Available for Pickup", ""),
            ParcelEventType::AwaitingCustomerPickup
        );
        assert_eq!(
            event_type("Notice Left (No Authorized Recipient Available)", ""),
            ParcelEventType::AwaitingCustomerAction
        );
        assert_eq!(
            event_type("Moving Through Network, Delayed", ""),
            ParcelEventType::Delayed
        );
        assert_eq!(event_type("Anything", "dl"), ParcelEventType::Delivered);
    }

    #[test]
    fn test_unparsable_event_is_skipped() {
        let body = r#"{"trackingEvents": [
            {"eventType": "Departed Post Office", "eventTimestamp": "yesterday"},
            {"eventType": "Departed Post Office", "eventTimestamp": "2025-03-04T22:00:00"}
        ]}"#;
        let data = parse_tracking_response(body).unwrap();
        assert_eq!(data.events.len(), 1);
        assert_eq!(data.events[0].event_type, ParcelEventType::Departed);
    }
}
