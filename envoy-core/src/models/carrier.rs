//! Carrier types.
//!
//! [`Carrier`] tags a tracking number with the shipping company that owns it.
//! `Unknown` is a valid classification, not an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Carrier
// ============================================================================

/// Shipping carriers Envoy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Carrier {
    /// Federal Express
    FedEx,
    /// United Parcel Service
    UPS,
    /// United States Postal Service
    USPS,
    /// DHL Express / eCommerce
    DHL,
    /// Amazon Logistics
    Amazon,
    /// OnTrac
    OnTrac,
    /// LaserShip
    LaserShip,
    /// No pattern matched.
    Unknown,
}

impl Carrier {
    /// Returns the display name for this carrier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FedEx => "FedEx",
            Self::UPS => "UPS",
            Self::USPS => "USPS",
            Self::DHL => "DHL",
            Self::Amazon => "Amazon",
            Self::OnTrac => "OnTrac",
            Self::LaserShip => "LaserShip",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns the CLI name for this carrier (lowercase, no spaces).
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::FedEx => "fedex",
            Self::UPS => "ups",
            Self::USPS => "usps",
            Self::DHL => "dhl",
            Self::Amazon => "amazon",
            Self::OnTrac => "ontrac",
            Self::LaserShip => "lasership",
            Self::Unknown => "unknown",
        }
    }

    /// Returns all carriers, `Unknown` last.
    pub fn all() -> &'static [Carrier] {
        &[
            Self::FedEx,
            Self::UPS,
            Self::USPS,
            Self::DHL,
            Self::Amazon,
            Self::OnTrac,
            Self::LaserShip,
            Self::Unknown,
        ]
    }

    /// Returns true for carriers with a tracking API client.
    pub fn is_trackable(&self) -> bool {
        matches!(self, Self::FedEx | Self::UPS | Self::USPS)
    }

    /// Builds the public tracking page link for a tracking number.
    ///
    /// Returns `None` for [`Carrier::Unknown`].
    pub fn tracking_url(&self, tracking_number: &str) -> Option<String> {
        let url = match self {
            Self::FedEx => format!("https://www.fedex.com/fedextrack/?trknbr={tracking_number}"),
            Self::UPS => format!("https://www.ups.com/track?tracknum={tracking_number}"),
            Self::USPS => {
                format!("https://tools.usps.com/go/TrackConfirmAction?tLabels={tracking_number}")
            }
            Self::DHL => format!(
                "https://www.dhl.com/us-en/home/tracking.html?tracking-id={tracking_number}"
            ),
            Self::Amazon => format!("https://track.amazon.com/tracking/{tracking_number}"),
            Self::OnTrac => format!("https://www.ontrac.com/tracking/?number={tracking_number}"),
            Self::LaserShip => format!("https://www.lasership.com/track/{tracking_number}"),
            Self::Unknown => return None,
        };
        Some(url)
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Carrier {
    type Err = CoreError;

    /// Parses a carrier from its CLI or display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| {
                c.cli_name().eq_ignore_ascii_case(needle)
                    || c.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CoreError::UnknownCarrier(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_cli_and_display_names() {
        assert_eq!("fedex".parse::<Carrier>().unwrap(), Carrier::FedEx);
        assert_eq!("UPS".parse::<Carrier>().unwrap(), Carrier::UPS);
        assert_eq!(" usps ".parse::<Carrier>().unwrap(), Carrier::USPS);
        assert_eq!("LaserShip".parse::<Carrier>().unwrap(), Carrier::LaserShip);
        assert!("royal mail".parse::<Carrier>().is_err());
    }

    #[test]
    fn test_trackable_carriers() {
        let trackable: Vec<_> = Carrier::all().iter().filter(|c| c.is_trackable()).collect();
        assert_eq!(trackable, vec![&Carrier::FedEx, &Carrier::UPS, &Carrier::USPS]);
    }

    #[test]
    fn test_tracking_urls() {
        assert_eq!(
            Carrier::UPS.tracking_url("1Z1234567890123456").as_deref(),
            Some("https://www.ups.com/track?tracknum=1Z1234567890123456")
        );
        assert_eq!(
            Carrier::USPS.tracking_url("9400111899223344556677").as_deref(),
            Some("https://tools.usps.com/go/TrackConfirmAction?tLabels=9400111899223344556677")
        );
        assert!(Carrier::Unknown.tracking_url("abc").is_none());
    }

    #[test]
    fn test_serde_uses_display_casing() {
        assert_eq!(serde_json::to_string(&Carrier::FedEx).unwrap(), r#""FedEx""#);
        let parsed: Carrier = serde_json::from_str(r#""USPS""#).unwrap();
        assert_eq!(parsed, Carrier::USPS);
    }
}
