//! Parcel types.
//!
//! - [`Parcel`] - One tracked shipment, keyed by tracking number
//! - [`ParcelData`] - Tracking payload from a successful fetch

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::carrier::Carrier;
use super::event::{ParcelEvent, ParcelEventType};

// ============================================================================
// Parcel Data
// ============================================================================

/// Tracking payload produced by a carrier normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelData {
    /// Events in the order the carrier returned them.
    pub events: Vec<ParcelEvent>,
    /// Whether any event carried the carrier's delivered signal.
    pub delivered: bool,
    /// Latest scheduled or rescheduled delivery date seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_projection: Option<DateTime<FixedOffset>>,
}

impl ParcelData {
    /// Creates data from events, deriving `delivered` from event types.
    pub fn from_events(events: Vec<ParcelEvent>) -> Self {
        let delivered = events.iter().any(ParcelEvent::is_delivered);
        Self {
            events,
            delivered,
            delivery_projection: None,
        }
    }

    /// Returns the event with the greatest timestamp.
    ///
    /// Carriers return events in arbitrary order, so position in the list
    /// carries no meaning. Ties resolve to the first such event in the list.
    pub fn last_event(&self) -> Option<&ParcelEvent> {
        self.events.iter().fold(None, |latest, event| match latest {
            Some(current) if current.timestamp >= event.timestamp => Some(current),
            _ => Some(event),
        })
    }

    /// Returns events sorted oldest first.
    pub fn chronological(&self) -> Vec<&ParcelEvent> {
        let mut events: Vec<_> = self.events.iter().collect();
        events.sort_by_key(|e| e.timestamp);
        events
    }

    /// Returns true if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ============================================================================
// Parcel
// ============================================================================

/// The normalized unit of tracking state.
///
/// In steady state exactly one of `data` and `error` is set. A parcel that
/// was added but never fetched has neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Display name; defaults to the tracking number.
    pub name: String,
    /// Owning carrier.
    pub carrier: Carrier,
    /// Natural key.
    pub tracking_number: String,
    /// Carrier tracking page link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    /// Payload from the last successful fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ParcelData>,
    /// Error from the last fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the parcel was last fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Parcel {
    /// Creates an empty parcel named after its tracking number.
    pub fn new(carrier: Carrier, tracking_number: impl Into<String>) -> Self {
        let tracking_number = tracking_number.into();
        Self {
            name: tracking_number.clone(),
            carrier,
            tracking_url: carrier.tracking_url(&tracking_number),
            tracking_number,
            data: None,
            error: None,
            updated_at: None,
        }
    }

    /// Creates a parcel carrying only an error.
    pub fn failed(
        carrier: Carrier,
        tracking_number: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(carrier, tracking_number).with_error(error)
    }

    /// Sets the display name. Blank names fall back to the tracking number.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.trim().is_empty() {
            self.tracking_number.clone()
        } else {
            name
        };
        self
    }

    /// Attaches tracking data and clears any previous error.
    #[must_use]
    pub fn with_data(mut self, data: ParcelData) -> Self {
        self.data = Some(data);
        self.error = None;
        self.updated_at = Some(Utc::now());
        self
    }

    /// Attaches an error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.updated_at = Some(Utc::now());
        self
    }

    /// Returns true if tracking data is present.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Returns true if the last fetch failed.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true if the parcel carries neither data nor an error.
    pub fn is_empty(&self) -> bool {
        !self.has_data() && !self.has_error()
    }

    /// Returns true if the display name is still the default.
    pub fn has_default_name(&self) -> bool {
        self.name == self.tracking_number
    }

    /// Returns the most recent event, if any.
    pub fn last_event(&self) -> Option<&ParcelEvent> {
        self.data.as_ref().and_then(ParcelData::last_event)
    }

    /// Returns the type of the most recent event.
    pub fn status(&self) -> Option<ParcelEventType> {
        self.last_event().map(|e| e.event_type)
    }

    /// Returns true if the carrier reported delivery.
    pub fn is_delivered(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.delivered)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event_at(hours: i64, event_type: ParcelEventType) -> ParcelEvent {
        let base = DateTime::parse_from_rfc3339("2025-02-25T11:48:00-08:00").unwrap();
        ParcelEvent::new(event_type, event_type.label(), "", base + Duration::hours(hours))
    }

    #[test]
    fn test_last_event_ignores_list_order() {
        let events = vec![
            event_at(1, ParcelEventType::Arrived),
            event_at(26, ParcelEventType::Delivered),
            event_at(0, ParcelEventType::OrderConfirmed),
        ];

        let mut permutations = vec![events.clone()];
        let mut reversed = events.clone();
        reversed.reverse();
        permutations.push(reversed);
        let mut rotated = events;
        rotated.rotate_left(1);
        permutations.push(rotated);

        for events in permutations {
            let data = ParcelData::from_events(events);
            assert_eq!(
                data.last_event().map(|e| e.event_type),
                Some(ParcelEventType::Delivered)
            );
        }
    }

    #[test]
    fn test_last_event_compares_instants_across_offsets() {
        let east = DateTime::parse_from_rfc3339("2025-03-01T10:00:00-05:00").unwrap();
        let west = DateTime::parse_from_rfc3339("2025-03-01T08:30:00-08:00").unwrap();
        let data = ParcelData::from_events(vec![
            ParcelEvent::new(ParcelEventType::Departed, "east", "", east),
            ParcelEvent::new(ParcelEventType::Arrived, "west", "", west),
        ]);
        assert_eq!(data.last_event().unwrap().description, "west");
    }

    #[test]
    fn test_delivered_derived_from_events() {
        let mut events = vec![event_at(0, ParcelEventType::PickedUp)];
        assert!(!ParcelData::from_events(events.clone()).delivered);

        events.push(event_at(5, ParcelEventType::Delivered));
        events.push(event_at(6, ParcelEventType::Unknown));
        assert!(ParcelData::from_events(events.clone()).delivered);

        events.retain(|e| !e.is_delivered());
        assert!(!ParcelData::from_events(events).delivered);
    }

    #[test]
    fn test_chronological_sorts_ascending() {
        let data = ParcelData::from_events(vec![
            event_at(3, ParcelEventType::Departed),
            event_at(1, ParcelEventType::PickedUp),
            event_at(2, ParcelEventType::Processing),
        ]);
        let types: Vec<_> = data.chronological().iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                ParcelEventType::PickedUp,
                ParcelEventType::Processing,
                ParcelEventType::Departed
            ]
        );
    }

    #[test]
    fn test_parcel_defaults() {
        let parcel = Parcel::new(Carrier::FedEx, "441259201412");
        assert_eq!(parcel.name, "441259201412");
        assert!(parcel.has_default_name());
        assert!(parcel.is_empty());
        assert_eq!(
            parcel.tracking_url.as_deref(),
            Some("https://www.fedex.com/fedextrack/?trknbr=441259201412")
        );
    }

    #[test]
    fn test_with_data_clears_error() {
        let parcel = Parcel::failed(Carrier::UPS, "1Z1234567890123456", "timeout")
            .with_data(ParcelData::default());
        assert!(parcel.has_data());
        assert!(!parcel.has_error());
        assert!(parcel.updated_at.is_some());
    }

    #[test]
    fn test_blank_name_falls_back() {
        let parcel = Parcel::new(Carrier::USPS, "9400111899223344556677").with_name("  ");
        assert!(parcel.has_default_name());
        let named = parcel.with_name("New shoes");
        assert_eq!(named.name, "New shoes");
    }
}
