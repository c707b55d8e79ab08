//! UPS tracking response parser.
//!
//! `trackResponse.shipment[]` holds shipments, each with `package[]`. A
//! package carries its own `activity[]` history and `deliveryDate[]`
//! milestones. Activity times are split into `YYYYMMDD` and `HHMMSS` fields
//! in the facility's local time, with `gmtOffset` naming that offset.

use chrono::{DateTime, FixedOffset};
use envoy_core::{Location, ParcelData, ParcelEvent, ParcelEventType};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::UpsError;
use crate::common::{parse_compact, parse_offset};

/// `deliveryDate` types that project a future delivery.
const PROJECTION_TYPES: &[&str] = &["SDD", "RDD"];

// ============================================================================
// Wire Types
// ============================================================================

/// Top-level Track API response.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingResponse {
    /// Response payload.
    pub track_response: Option<TrackResponse>,
}

/// Response payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TrackResponse {
    /// Shipments matching the inquiry.
    pub shipment: Vec<Shipment>,
}

/// One shipment.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Shipment {
    /// The number that was asked about.
    pub inquiry_number: String,
    /// Packages in the shipment.
    pub package: Vec<Package>,
    /// Warnings, sent in place of packages when nothing is known.
    pub warnings: Vec<Warning>,
}

/// One package.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Package {
    /// Package tracking number.
    pub tracking_number: String,
    /// Scan history, newest first.
    pub activity: Vec<Activity>,
    /// Scheduled, rescheduled, and actual delivery dates.
    pub delivery_date: Vec<DeliveryDate>,
    /// Current status summary.
    pub current_status: Option<Status>,
}

/// One scan.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    /// Where the scan happened.
    pub location: Option<ActivityLocation>,
    /// Scan status.
    pub status: Option<Status>,
    /// Local date (`YYYYMMDD`).
    pub date: String,
    /// Local time (`HHMMSS`).
    pub time: String,
    /// UTC date (`YYYYMMDD`).
    pub gmt_date: String,
    /// UTC time (`HH:MM:SS`).
    pub gmt_time: String,
    /// Facility offset from UTC (e.g., `-05:00`).
    pub gmt_offset: String,
}

/// Scan location wrapper.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActivityLocation {
    /// Postal address.
    pub address: Option<Address>,
}

/// A UPS address.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    /// City.
    pub city: Option<String>,
    /// State or province code.
    pub state_province: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// ISO country code.
    pub country_code: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

impl Address {
    /// Renders the address as an event location.
    pub fn to_location(&self) -> Location {
        Location::new(
            self.city.as_deref(),
            self.state_province.as_deref(),
            self.postal_code.as_deref(),
            self.country_code.as_deref().or(self.country.as_deref()),
        )
    }
}

/// Status attached to a scan or a package.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Status {
    /// Status type (`D` delivered, `I` in transit, `X` exception, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Status description.
    pub description: String,
    /// Activity code (e.g., `FS`).
    pub code: String,
    /// Two-character status code (e.g., `2W`).
    pub status_code: String,
    /// Short description.
    pub simplified_text_description: String,
}

/// A typed delivery date.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeliveryDate {
    /// `SDD` scheduled, `RDD` rescheduled, `DEL` actual.
    #[serde(rename = "type")]
    pub kind: String,
    /// Date (`YYYYMMDD`).
    pub date: String,
}

/// Shipment warning.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Warning {
    /// Warning code.
    pub code: String,
    /// Warning message.
    pub message: String,
}

// ============================================================================
// Event Mapping
// ============================================================================

/// Maps a UPS activity code to an event type.
pub fn code_event_type(code: &str) -> ParcelEventType {
    match code.trim().to_ascii_uppercase().as_str() {
        "MP" => ParcelEventType::OrderConfirmed,
        "OR" | "AR" => ParcelEventType::Arrived,
        "YP" => ParcelEventType::Processing,
        "DP" => ParcelEventType::Departed,
        "OF" => ParcelEventType::OnVehicle,
        "OT" | "2K" => ParcelEventType::OutForDelivery,
        "FS" => ParcelEventType::Delivered,
        _ => ParcelEventType::Unknown,
    }
}

/// Maps a UPS two-character status code to an event type.
pub fn status_code_event_type(code: &str) -> ParcelEventType {
    match code.trim().to_ascii_uppercase().as_str() {
        "00" | "09" | "12" | "2D" | "2J" | "32" | "41" | "42" | "44" => ParcelEventType::Delayed,
        "1N" | "1Z" | "2C" | "2Q" => ParcelEventType::AwaitingCustomerPickup,
        "28" => ParcelEventType::Held,
        "2K" => ParcelEventType::OutForDelivery,
        "2W" | "3F" | "3G" | "3H" => ParcelEventType::Delivered,
        "38" => ParcelEventType::AwaitingCustomerAction,
        "4X" => ParcelEventType::TransferredToLocal,
        _ => ParcelEventType::Unknown,
    }
}

/// Maps a UPS status type to an event type.
pub fn status_type_event_type(kind: &str) -> ParcelEventType {
    match kind.trim().to_ascii_uppercase().as_str() {
        "X" => ParcelEventType::Delayed,
        "RS" => ParcelEventType::ReturnedToSender,
        _ => ParcelEventType::Unknown,
    }
}

impl Status {
    /// Event type from the activity code, then the status code, then the type.
    pub fn parcel_event_type(&self) -> ParcelEventType {
        [
            code_event_type(&self.code),
            status_code_event_type(&self.status_code),
            status_type_event_type(&self.kind),
        ]
        .into_iter()
        .find(|t| *t != ParcelEventType::Unknown)
        .unwrap_or(ParcelEventType::Unknown)
    }

    /// True when the status type is `D` or the activity code is `FS`.
    pub fn is_delivered(&self) -> bool {
        self.kind.trim().eq_ignore_ascii_case("D") || self.code.trim().eq_ignore_ascii_case("FS")
    }

    fn text(&self) -> Option<&str> {
        [&self.description, &self.simplified_text_description]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

impl Activity {
    /// Scan time in the facility's offset.
    ///
    /// Falls back to the GMT fields when the local ones are missing.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let offset = parse_offset(&self.gmt_offset);
        if let Some(local) = parse_compact(&self.date, Some(&self.time), offset) {
            return Some(local);
        }

        let gmt_time = self.gmt_time.replace(':', "");
        let utc = parse_compact(&self.gmt_date, Some(&gmt_time), None)?;
        Some(match offset {
            Some(offset) => utc.with_timezone(&offset),
            None => utc,
        })
    }

    /// Converts the scan into a normalized event.
    ///
    /// Returns `None` if the timestamp cannot be parsed.
    pub fn to_event(&self) -> Option<ParcelEvent> {
        let Some(timestamp) = self.timestamp() else {
            warn!(date = %self.date, time = %self.time, "Skipping UPS activity with unparsable date");
            return None;
        };

        let event_type = self
            .status
            .as_ref()
            .map_or(ParcelEventType::Unknown, Status::parcel_event_type);
        let description = self
            .status
            .as_ref()
            .and_then(Status::text)
            .unwrap_or_else(|| event_type.label());
        let location = self
            .location
            .as_ref()
            .and_then(|l| l.address.as_ref())
            .map(|a| a.to_location().to_string())
            .unwrap_or_default();

        Some(ParcelEvent::new(event_type, description, location, timestamp))
    }

    fn is_delivered(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_delivered)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalizes one package.
///
/// Only status type `D` or activity code `FS` mark the package delivered;
/// delivered-looking status codes such as `2W` only set the event type.
pub fn normalize(package: &Package) -> ParcelData {
    let events = package
        .activity
        .iter()
        .filter_map(Activity::to_event)
        .collect();

    let mut data = ParcelData::from_events(events);
    data.delivered = package.activity.iter().any(Activity::is_delivered)
        || package
            .current_status
            .as_ref()
            .is_some_and(Status::is_delivered);
    data.delivery_projection = package
        .delivery_date
        .iter()
        .filter(|d| PROJECTION_TYPES.contains(&d.kind.trim()))
        .filter_map(|d| parse_compact(&d.date, None, None))
        .max();
    data
}

/// Parses a Track API response body for one tracking number.
///
/// When no package matches, the first shipment warning becomes a
/// [`UpsError::Tracking`].
pub fn parse_tracking_response(tracking_number: &str, body: &str) -> Result<ParcelData, UpsError> {
    debug!(len = body.len(), "Parsing UPS response");

    let response: TrackingResponse = serde_json::from_str(body)
        .map_err(|e| UpsError::InvalidResponse(format!("Invalid JSON: {e}")))?;

    let shipments = response
        .track_response
        .map(|r| r.shipment)
        .unwrap_or_default();
    let packages: Vec<&Package> = shipments.iter().flat_map(|s| s.package.iter()).collect();

    let package = packages
        .iter()
        .find(|p| p.tracking_number.eq_ignore_ascii_case(tracking_number))
        .or_else(|| packages.first().filter(|_| packages.len() == 1));

    if let Some(package) = package {
        return Ok(normalize(package));
    }

    match shipments.iter().flat_map(|s| s.warnings.iter()).next() {
        Some(warning) => Err(UpsError::Tracking {
            code: warning.code.clone(),
            message: warning.message.clone(),
        }),
        None => Err(UpsError::MissingResult(tracking_number.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
