//! Tracking event types.
//!
//! - [`ParcelEventType`] - Shared event vocabulary across carriers
//! - [`ParcelEvent`] - One timestamped milestone

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ============================================================================
// Event Type
// ============================================================================

/// Closed event vocabulary every carrier's native codes map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParcelEventType {
    /// Label created / shipment information received.
    OrderConfirmed,
    /// Carrier asserts the parcel is on schedule.
    ExpectedOnTime,
    /// Carrier took possession.
    PickedUp,
    /// Left a facility.
    Departed,
    /// Being processed at a facility.
    Processing,
    /// Arrived at a facility.
    Arrived,
    /// Loaded on the delivery vehicle.
    OnVehicle,
    /// Out for delivery.
    OutForDelivery,
    /// Delivered.
    Delivered,
    /// Delayed in transit.
    Delayed,
    /// Held by the carrier.
    Held,
    /// Recipient needs to act (e.g. notice left).
    AwaitingCustomerAction,
    /// Ready for pickup by the recipient.
    AwaitingCustomerPickup,
    /// Handed to a local carrier for final delivery.
    TransferredToLocal,
    /// Cannot be delivered.
    Undeliverable,
    /// Returning to sender.
    ReturnedToSender,
    /// Native code had no mapping.
    #[default]
    Unknown,
}

impl ParcelEventType {
    /// Returns the uppercase display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OrderConfirmed => "ORDER CONFIRMED",
            Self::ExpectedOnTime => "EXPECTED ON TIME",
            Self::PickedUp => "PICKED UP",
            Self::Departed => "DEPARTED",
            Self::Processing => "PROCESSING",
            Self::Arrived => "ARRIVED",
            Self::OnVehicle => "ON DELIVERY VEHICLE",
            Self::OutForDelivery => "OUT FOR DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Delayed => "DELAYED",
            Self::Held => "HELD",
            Self::AwaitingCustomerAction => "AWAITING CUSTOMER ACTION",
            Self::AwaitingCustomerPickup => "AWAITING CUSTOMER PICKUP",
            Self::TransferredToLocal => "TRANSFERRED TO LOCAL",
            Self::Undeliverable => "UNDELIVERABLE",
            Self::ReturnedToSender => "RETURNED TO SENDER",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for [`ParcelEventType::Delivered`].
    pub fn is_delivered(&self) -> bool {
        *self == Self::Delivered
    }

    /// Returns true if the parcel needs attention from someone.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Self::Delayed
                | Self::Held
                | Self::AwaitingCustomerAction
                | Self::Undeliverable
                | Self::ReturnedToSender
        )
    }
}

impl fmt::Display for ParcelEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Parcel Event
// ============================================================================

/// A single tracking milestone.
///
/// Timestamps keep the offset the carrier reported so that display can show
/// local facility time; ordering compares instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelEvent {
    /// Normalized event type.
    #[serde(rename = "type")]
    pub event_type: ParcelEventType,
    /// Carrier text, or the type label when the carrier only sent a code.
    pub description: String,
    /// Location rendered as `CITY, STATE ZIP, COUNTRY`.
    #[serde(default)]
    pub location: String,
    /// When the event happened.
    pub timestamp: DateTime<FixedOffset>,
}

impl ParcelEvent {
    /// Creates a new event.
    pub fn new(
        event_type: ParcelEventType,
        description: impl Into<String>,
        location: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            event_type,
            description: description.into(),
            location: location.into(),
            timestamp,
        }
    }

    /// Returns true if this event marks delivery.
    pub fn is_delivered(&self) -> bool {
        self.event_type.is_delivered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ParcelEventType::OnVehicle.label(), "ON DELIVERY VEHICLE");
        assert_eq!(ParcelEventType::ExpectedOnTime.to_string(), "EXPECTED ON TIME");
        assert_eq!(ParcelEventType::default(), ParcelEventType::Unknown);
    }

    #[test]
    fn test_exception_types() {
        assert!(ParcelEventType::Held.is_exception());
        assert!(ParcelEventType::ReturnedToSender.is_exception());
        assert!(!ParcelEventType::Delivered.is_exception());
        assert!(!ParcelEventType::Unknown.is_exception());
    }

    #[test]
    fn test_event_serializes_type_field() {
        let ts = DateTime::parse_from_rfc3339("2025-02-25T11:48:00-08:00").unwrap();
        let event = ParcelEvent::new(ParcelEventType::OutForDelivery, "Out", "", ts);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "out_for_delivery");
        assert_eq!(json["timestamp"], "2025-02-25T11:48:00-08:00");
    }
}
