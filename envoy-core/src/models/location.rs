//! Event location formatting.

use std::fmt;

/// Country code treated as domestic and left out of rendered locations.
pub const DOMESTIC_COUNTRY: &str = "US";

/// Address parts reported with a tracking event.
///
/// Renders as `CITY, STATE ZIP, COUNTRY`, uppercased, with absent parts
/// skipped and the country dropped when domestic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// City name.
    pub city: Option<String>,
    /// State or province code.
    pub state: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// ISO country code.
    pub country: Option<String>,
}

fn present(part: Option<&str>) -> Option<String> {
    part.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

impl Location {
    /// Creates a location; blank parts count as absent.
    pub fn new(
        city: Option<&str>,
        state: Option<&str>,
        postal_code: Option<&str>,
        country: Option<&str>,
    ) -> Self {
        Self {
            city: present(city),
            state: present(state),
            postal_code: present(postal_code),
            country: present(country),
        }
    }

    /// Returns true if no part is present.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match (&self.state, &self.postal_code) {
            (Some(state), Some(zip)) => Some(format!("{state} {zip}")),
            (Some(part), None) | (None, Some(part)) => Some(part.clone()),
            (None, None) => None,
        };
        let country = self
            .country
            .as_ref()
            .filter(|c| c.as_str() != DOMESTIC_COUNTRY)
            .cloned();

        let segments: Vec<String> = [self.city.clone(), region, country]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&segments.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domestic_country_omitted() {
        let loc = Location::new(Some("Los Angeles"), Some("CA"), Some("90001"), Some("US"));
        assert_eq!(loc.to_string(), "LOS ANGELES, CA 90001");
    }

    #[test]
    fn test_foreign_country_appended() {
        let loc = Location::new(Some("Los Angeles"), Some("CA"), Some("90001"), Some("MX"));
        assert_eq!(loc.to_string(), "LOS ANGELES, CA 90001, MX");
    }

    #[test]
    fn test_partial_locations() {
        assert_eq!(
            Location::new(Some("Altoona"), Some("pa"), None, None).to_string(),
            "ALTOONA, PA"
        );
        assert_eq!(
            Location::new(None, None, Some("90001"), Some("us")).to_string(),
            "90001"
        );
        assert_eq!(
            Location::new(Some("Toronto"), None, None, Some("CA")).to_string(),
            "TORONTO, CA"
        );
    }

    #[test]
    fn test_blank_parts_are_absent() {
        let loc = Location::new(Some(" "), Some(""), None, Some("US"));
        assert!(!loc.is_empty());
        assert_eq!(loc.to_string(), "");
        assert!(Location::new(None, Some(""), None, None).is_empty());
    }
}
