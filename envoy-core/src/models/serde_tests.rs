//! Serde tests for parcel types.
//!
//! The store persists parcels as JSON, so stored files must keep reading
//! back after field additions.

use chrono::DateTime;

use crate::{Carrier, Parcel, ParcelData, ParcelEvent, ParcelEventType};

fn sample_parcel() -> Parcel {
    let ts = DateTime::parse_from_rfc3339("2025-02-25T11:48:00-08:00").unwrap();
    let mut data = ParcelData::from_events(vec![
        ParcelEvent::new(
            ParcelEventType::OrderConfirmed,
            "Shipment information sent to FedEx",
            "ALTOONA, PA",
            ts,
        ),
        ParcelEvent::new(
            ParcelEventType::Delivered,
            "Delivered",
            "LOS ANGELES, CA 90001",
            ts + chrono::Duration::hours(26),
        ),
    ]);
    data.delivery_projection = Some(ts + chrono::Duration::hours(30));
    Parcel::new(Carrier::FedEx, "441259201412")
        .with_name("Test Parcel")
        .with_data(data)
}

#[test]
fn test_parcel_json_keeps_event_offsets() {
    let parcel = sample_parcel();
    let json = serde_json::to_string(&parcel).unwrap();
    let parsed: Parcel = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, parcel);
    let first = &parsed.data.as_ref().unwrap().events[0];
    assert_eq!(first.timestamp.offset().local_minus_utc(), -8 * 3600);
}

#[test]
fn test_empty_optionals_are_skipped() {
    let parcel = Parcel::new(Carrier::Unknown, "???");
    let value = serde_json::to_value(&parcel).unwrap();
    let obj = value.as_object().unwrap();

    assert!(!obj.contains_key("data"));
    assert!(!obj.contains_key("error"));
    assert!(!obj.contains_key("tracking_url"));
    assert!(!obj.contains_key("updated_at"));
}

#[test]
fn test_minimal_stored_parcel_deserializes() {
    let json = r#"{"name":"Boots","carrier":"UPS","tracking_number":"1Z1234567890123456"}"#;
    let parcel: Parcel = serde_json::from_str(json).unwrap();

    assert_eq!(parcel.carrier, Carrier::UPS);
    assert!(parcel.is_empty());
}

#[test]
fn test_every_event_type_roundtrips() {
    let all = [
        ParcelEventType::OrderConfirmed,
        ParcelEventType::ExpectedOnTime,
        ParcelEventType::PickedUp,
        ParcelEventType::Departed,
        ParcelEventType::Processing,
        ParcelEventType::Arrived,
        ParcelEventType::OnVehicle,
        ParcelEventType::OutForDelivery,
        ParcelEventType::Delivered,
        ParcelEventType::Delayed,
        ParcelEventType::Held,
        ParcelEventType::AwaitingCustomerAction,
        ParcelEventType::AwaitingCustomerPickup,
        ParcelEventType::TransferredToLocal,
        ParcelEventType::Undeliverable,
        ParcelEventType::ReturnedToSender,
        ParcelEventType::Unknown,
    ];
    for t in all {
        let json = serde_json::to_string(&t).unwrap();
        let back: ParcelEventType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t, "round-trip failed for {t:?}");
    }
}

#[test]
fn test_unknown_carrier_string_is_rejected() {
    let result: Result<Carrier, _> = serde_json::from_str(r#""Royal Mail""#);
    assert!(result.is_err());
}
