//! Integration tests for the public classification API.

use std::collections::BTreeMap;

use envoy_core::{Carrier, classify, classify_detailed};

#[test]
fn test_batch_grouping_assigns_each_number_once() {
    let inputs = [
        "1Z1234567890123456",
        "123456789012",
        "1234567890",
        "94001118992233445566",
        "12345678901234567890",
        "123456789012345678901234567890",
    ];

    let mut groups: BTreeMap<Carrier, Vec<&str>> = BTreeMap::new();
    for tn in inputs {
        groups.entry(classify(tn)).or_default().push(tn);
    }

    let total: usize = groups.values().map(Vec::len).sum();
    assert_eq!(total, inputs.len());
    assert_eq!(groups[&Carrier::FedEx], vec!["123456789012", "12345678901234567890"]);
    assert_eq!(groups[&Carrier::UPS], vec!["1Z1234567890123456"]);
    assert_eq!(groups[&Carrier::DHL], vec!["1234567890"]);
    assert_eq!(groups[&Carrier::USPS], vec!["94001118992233445566"]);
    assert_eq!(groups[&Carrier::Unknown].len(), 1);
}

#[test]
fn test_classification_is_deterministic() {
    for tn in ["1Z999AA10123456784", "9405511899223344556677", "garbage"] {
        assert_eq!(classify_detailed(tn), classify_detailed(tn));
    }
}

#[test]
fn test_non_ascii_digits_are_unknown() {
    for raw in ["１２３４５６７８９０１２", "١٢٣٤٥٦٧٨٩٠", "1Z５３３８FF0107231059", "TBA１２３４５６７８９０１２"] {
        let classification = classify_detailed(raw);
        assert_eq!(classification.carrier, Carrier::Unknown, "input {raw:?}");
        assert_eq!(classification.format, None, "input {raw:?}");
    }
}
