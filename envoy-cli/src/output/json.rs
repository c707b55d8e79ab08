//! JSON output formatting.

use anyhow::Result;
use envoy_carriers::CarrierDescriptor;
use envoy_core::{Classification, Parcel};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a classified tracking number.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationOutput {
    pub tracking_number: String,
    pub carrier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
}

/// Carrier info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierInfoOutput {
    pub id: String,
    pub display_name: String,
    pub cli_name: String,
    pub aliases: Vec<String>,
    pub website: String,
    pub trackable: bool,
    pub configured: bool,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// Pretty-printing JSON formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Formats parcels as an array.
    pub fn format_parcels(parcels: &[Parcel]) -> Result<String> {
        Self::format(parcels)
    }

    /// Formats classifications as an array.
    pub fn format_classifications(items: &[(String, Classification)]) -> Result<String> {
        let outputs: Vec<ClassificationOutput> = items
            .iter()
            .map(|(tn, c)| ClassificationOutput {
                tracking_number: tn.clone(),
                carrier: c.carrier.cli_name().to_string(),
                format: c.format,
                tracking_url: c.carrier.tracking_url(tn),
            })
            .collect();

        Self::format(&outputs)
    }

    /// Formats the carrier list.
    pub fn format_carriers(carriers: &[(&CarrierDescriptor, bool)]) -> Result<String> {
        let outputs: Vec<CarrierInfoOutput> = carriers
            .iter()
            .map(|(desc, configured)| CarrierInfoOutput {
                id: desc.cli_name().to_string(),
                display_name: desc.display_name().to_string(),
                cli_name: desc.cli_name().to_string(),
                aliases: desc.metadata.aliases.iter().map(ToString::to_string).collect(),
                website: desc.metadata.website.to_string(),
                trackable: desc.is_trackable(),
                configured: *configured,
            })
            .collect();

        Self::format(&outputs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_pretty() {
        let output = JsonFormatter::format(&serde_json::json!({"key": "value"})).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_empty_parcels_is_array() {
        assert_eq!(JsonFormatter::format_parcels(&[]).unwrap(), "[]");
    }
}
