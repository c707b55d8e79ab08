//! Tracking number classification.
//!
//! Classification is an ordered, short-circuiting walk over a fixed rule
//! table: literal-prefix formats come first, broad length-only formats last.
//! The first rule whose pattern matches the whole normalized string wins.
//! Every input yields exactly one [`Carrier`], with `Unknown` as fallback.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Carrier;

// ============================================================================
// Rule Table
// ============================================================================

/// `(pattern, carrier, format name)` in evaluation order.
///
/// 20-digit numbers: USPS prefixes 92-95 are checked before the FedEx
/// length rule, so any other 20-digit number falls through to FedEx.
const RULES: &[(&str, Carrier, &str)] = &[
    (r"^1Z[A-Z0-9]{16}$", Carrier::UPS, "UPS 1Z"),
    (r"^TBA[0-9]{12}$", Carrier::Amazon, "Amazon Logistics"),
    (r"^1LS[A-Z0-9]{12,15}$", Carrier::LaserShip, "LaserShip 1LS"),
    (r"^L[A-Z][0-9]{8}$", Carrier::LaserShip, "LaserShip"),
    (r"^[CD][0-9]{14}$", Carrier::OnTrac, "OnTrac"),
    (r"^JJD[0-9]{10,18}$", Carrier::DHL, "DHL JJD"),
    (r"^GM[0-9]{16,18}$", Carrier::DHL, "DHL eCommerce GM"),
    (r"^[A-Z]{5}[0-9]{10}$", Carrier::DHL, "DHL eCommerce"),
    (r"^[A-Z]{3}[0-9]{7}$", Carrier::DHL, "DHL eCommerce"),
    (r"^[0-9]{10,11}$", Carrier::DHL, "DHL Express"),
    (r"^(MI|YW|UP)[0-9]{15,22}$", Carrier::UPS, "UPS Mail Innovations"),
    (r"^H[0-9]{9,10}$", Carrier::UPS, "UPS Freight"),
    (r"^T[0-9]{10}$", Carrier::UPS, "UPS"),
    (r"^([0-9]{9}|[0-9]{18})$", Carrier::UPS, "UPS numeric"),
    (r"^9[2-5][0-9]{18}$", Carrier::USPS, "USPS IMpb 20"),
    (r"^9[1-5][0-9]{20}$", Carrier::USPS, "USPS IMpb 22"),
    (r"^420[0-9]{5}9([0-9]{21}|[0-9]{25})$", Carrier::USPS, "USPS ZIP + IMpb"),
    (r"^[A-Z]{2}[0-9]{9}[A-Z]{2}$", Carrier::USPS, "USPS International"),
    (r"^96[0-9]{20}$", Carrier::FedEx, "FedEx Ground 22"),
    (r"^DT[0-9]{12}$", Carrier::FedEx, "FedEx Door Tag"),
    (r"^([0-9]{12}|[0-9]{14}|[0-9]{15}|[0-9]{20})$", Carrier::FedEx, "FedEx"),
    (r"^[0-9]{13}$", Carrier::USPS, "USPS Domestic 13"),
];

struct Rule {
    pattern: Regex,
    carrier: Carrier,
    format: &'static str,
}

static COMPILED: OnceLock<Vec<Rule>> = OnceLock::new();

fn compile_rules() -> Vec<Rule> {
    RULES
        .iter()
        .filter_map(|&(pattern, carrier, format)| {
            Regex::new(pattern).ok().map(|pattern| Rule {
                pattern,
                carrier,
                format,
            })
        })
        .collect()
}

fn rules() -> &'static [Rule] {
    COMPILED.get_or_init(compile_rules)
}

// ============================================================================
// Public API
// ============================================================================

/// Result of classifying a tracking number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The carrier that owns the format.
    pub carrier: Carrier,
    /// Name of the matched format; `None` when unknown.
    pub format: Option<&'static str>,
}

/// Strips whitespace and hyphens and uppercases ASCII letters.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Classifies a raw tracking number into a carrier.
pub fn classify(raw: &str) -> Carrier {
    classify_detailed(raw).carrier
}

/// Classifies a raw tracking number, also naming the matched format.
pub fn classify_detailed(raw: &str) -> Classification {
    let normalized = normalize(raw);
    rules()
        .iter()
        .find(|rule| rule.pattern.is_match(&normalized))
        .map_or(
            Classification {
                carrier: Carrier::Unknown,
                format: None,
            },
            |rule| Classification {
                carrier: rule.carrier,
                format: Some(rule.format),
            },
        )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rule_compiles() {
        assert_eq!(rules().len(), RULES.len());
    }

    #[test]
    fn test_precedence_table() {
        assert_eq!(classify("1Z1234567890123456"), Carrier::UPS);
        assert_eq!(classify("123456789012"), Carrier::FedEx);
        assert_eq!(classify("1234567890"), Carrier::DHL);
        assert_eq!(classify("94001118992233445566"), Carrier::USPS);
        assert_eq!(classify("92001118992233445566"), Carrier::USPS);
        assert_eq!(classify("93001118992233445566"), Carrier::USPS);
        assert_eq!(classify("95001111111111111111"), Carrier::USPS);
        assert_eq!(classify("96001118992233445566"), Carrier::FedEx);
        assert_eq!(classify("12345678901234567890"), Carrier::FedEx);
        assert_eq!(classify("123456789012345678901234567890"), Carrier::Unknown);
    }

    #[test]
    fn test_numeric_lengths() {
        assert_eq!(classify("123456789"), Carrier::UPS);
        assert_eq!(classify("12345678901"), Carrier::DHL);
        assert_eq!(classify("1234567890123"), Carrier::USPS);
        assert_eq!(classify("12345678901234"), Carrier::FedEx);
        assert_eq!(classify("123456789012345"), Carrier::FedEx);
        assert_eq!(classify("123456789012345678"), Carrier::UPS);
        assert_eq!(classify("9400111899223344556677"), Carrier::USPS);
        assert_eq!(classify("9612345678901234567890"), Carrier::FedEx);
    }

    #[test]
    fn test_prefixed_formats() {
        assert_eq!(classify("TBA123456789012"), Carrier::Amazon);
        assert_eq!(classify("1LS123456789012"), Carrier::LaserShip);
        assert_eq!(classify("LX12345678"), Carrier::LaserShip);
        assert_eq!(classify("C12345678901234"), Carrier::OnTrac);
        assert_eq!(classify("JJD0123456789"), Carrier::DHL);
        assert_eq!(classify("GM1234567890123456"), Carrier::DHL);
        assert_eq!(classify("EA123456789US"), Carrier::USPS);
        assert_eq!(classify("DT123456789012"), Carrier::FedEx);
        assert_eq!(classify("H123456789"), Carrier::UPS);
        assert_eq!(classify("MI123456789012345"), Carrier::UPS);
        assert_eq!(
            classify("420902109405511899223344556677"),
            Carrier::USPS
        );
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize(" 1z 12-34 56\t"), "1Z123456");
        assert_eq!(classify("1z 1234 5678 9012 3456"), Carrier::UPS);
        assert_eq!(classify("1234-5678-9012"), Carrier::FedEx);
    }

    #[test]
    fn test_total_over_odd_inputs() {
        for raw in ["", " ", "-", "???", "1Z", "ZZZZZZZZZZZZ", "💌", "1Z!@#$%^&*()"] {
            assert_eq!(classify(raw), Carrier::Unknown, "input {raw:?}");
        }
    }

    #[test]
    fn test_total_over_printable_ascii() {
        // Every length from 0..40 over a few alphabets must classify without panicking.
        for len in 0..40 {
            for seed in ["0", "9", "A", "1Z", "~"] {
                let raw: String = seed.chars().cycle().take(len).collect();
                let carrier = classify(&raw);
                assert!(Carrier::all().contains(&carrier));
            }
        }
    }

    #[test]
    fn test_detailed_names_format() {
        let c = classify_detailed("1Z1234567890123456");
        assert_eq!(c.carrier, Carrier::UPS);
        assert_eq!(c.format, Some("UPS 1Z"));
        assert_eq!(classify_detailed("nope").format, None);
    }
}
