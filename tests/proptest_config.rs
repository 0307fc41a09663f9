//! Property-based tests using proptest
//!
//! These tests check the config flattening, attribute encoding and plan
//! normalization rules against randomized inputs.

use hrec::resource::flatten::{coerce_declared, read_map_list, write_map_list, COUNT_MARKER};
use hrec::resource::plan_name::{is_qualified, normalize_plan, service_name};
use hrec::resource::{flatten, unflatten, AddonRecord, Attributes, FlatConfig, Managed};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

/// Config keys as users write them; never the count marker
fn arb_key() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_.-]{0,15}"
}

fn arb_config() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(arb_key(), "\\PC{0,24}", 0..12)
}

fn arb_service() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}"
}

fn arb_plan() -> impl Strategy<Value = String> {
    (arb_service(), prop::option::of("[a-z0-9-]{1,12}")).prop_map(|(service, qualifier)| {
        match qualifier {
            Some(q) => format!("{service}:{q}"),
            None => service,
        }
    })
}

fn arb_record() -> impl Strategy<Value = AddonRecord> {
    (
        "[a-f0-9-]{1,36}",
        arb_service(),
        arb_plan(),
        prop::option::of(prop::collection::btree_map(arb_key(), "\\PC{0,12}", 1..6)),
        prop::collection::vec(prop::collection::btree_map(arb_key(), arb_key(), 0..4), 0..3),
    )
        .prop_map(|(id, app, plan, config, config_vars)| AddonRecord {
            id,
            name: format!("{app}-addon"),
            app,
            plan,
            provider_id: "resource@heroku.com".into(),
            config: config.map(|c| flatten(&c)),
            config_vars,
        })
}

proptest! {
    /// Flattening then unflattening gives the original mapping back
    #[test]
    fn unflatten_inverts_flatten(config in arb_config()) {
        prop_assert_eq!(unflatten(&flatten(&config)), config);
    }

    /// Entries come out sorted by key, one per key
    #[test]
    fn flatten_is_sorted_and_unique(config in arb_config()) {
        let flat = flatten(&config);
        prop_assert_eq!(flat.len(), config.len());
        for pair in flat.entries().windows(2) {
            prop_assert!(pair[0].key < pair[1].key);
        }
    }

    /// Lookup agrees with the source mapping
    #[test]
    fn get_finds_every_key(config in arb_config()) {
        let flat = flatten(&config);
        for (key, value) in &config {
            prop_assert_eq!(flat.get(key), Some(value.as_str()));
        }
        prop_assert_eq!(flat.get(COUNT_MARKER), None);
    }

    /// The count marker never survives flattening
    #[test]
    fn count_marker_is_discarded(mut config in arb_config(), value in "\\PC{0,8}") {
        config.insert(COUNT_MARKER.to_string(), value);
        let flat = flatten(&config);
        prop_assert_eq!(flat.len(), config.len() - 1);
        prop_assert!(!unflatten(&flat).contains_key(COUNT_MARKER));
    }

    /// Configs survive the attribute table with a count equal to their size
    #[test]
    fn config_attributes_roundtrip(config in arb_config()) {
        let flat = flatten(&config);
        let mut attrs = Attributes::new();
        flat.write_attributes(&mut attrs, "config");

        let restored = FlatConfig::from_attributes(&attrs, "config").unwrap();
        if flat.is_empty() {
            prop_assert!(attrs.is_empty());
            prop_assert!(restored.is_none());
        } else {
            prop_assert_eq!(attrs.get("config.#").map(String::as_str), Some("1"));
            let count = flat.len().to_string();
            prop_assert_eq!(attrs.get("config.0.#"), Some(&count));
            prop_assert_eq!(restored, Some(flat));
        }
    }

    /// Map lists keep their order and contents
    #[test]
    fn map_list_roundtrip(maps in prop::collection::vec(arb_config(), 0..4)) {
        let mut attrs = Attributes::new();
        write_map_list(&mut attrs, "items", &maps);
        prop_assert_eq!(read_map_list(&attrs, "items").unwrap(), maps);
    }

    /// A disagreeing element count is rejected
    #[test]
    fn map_list_rejects_bad_count(config in arb_config()) {
        let mut attrs = Attributes::new();
        write_map_list(&mut attrs, "items", &[config.clone()]);
        attrs.insert("items.0.#".into(), (config.len() + 1).to_string());
        prop_assert!(read_map_list(&attrs, "items").is_err());
    }

    /// Integers and booleans become their canonical text
    #[test]
    fn scalars_are_coerced(key in arb_key(), n in any::<i64>(), b in any::<bool>()) {
        let declared: BTreeMap<String, Value> = [
            (format!("{key}_n"), Value::from(n)),
            (format!("{key}_b"), Value::from(b)),
        ]
        .into_iter()
        .collect();

        let coerced = coerce_declared(&declared).unwrap();
        prop_assert_eq!(&coerced[&format!("{key}_n")], &n.to_string());
        prop_assert_eq!(&coerced[&format!("{key}_b")], &b.to_string());
    }

    /// Nested values are rejected
    #[test]
    fn nested_values_are_rejected(key in arb_key(), inner in arb_config()) {
        let nested = serde_json::to_value(&inner).unwrap();
        let declared: BTreeMap<String, Value> = [(key, nested)].into_iter().collect();
        prop_assert!(coerce_declared(&declared).is_err());
    }
}

proptest! {
    /// A qualified or empty declaration keeps what the server reports
    #[test]
    fn qualified_declaration_keeps_reported(declared in arb_plan(), reported in arb_plan()) {
        prop_assume!(is_qualified(&declared));
        prop_assert_eq!(normalize_plan(&declared, &reported), reported.clone());
        prop_assert_eq!(normalize_plan("", &reported), reported);
    }

    /// An unqualified declaration records the unqualified service name
    #[test]
    fn unqualified_declaration_strips_qualifier(service in arb_service(), reported in arb_plan()) {
        let normalized = normalize_plan(&service, &reported);
        prop_assert!(!is_qualified(&normalized));
        prop_assert_eq!(normalized.as_str(), service_name(&reported));
    }

    /// Normalizing twice changes nothing
    #[test]
    fn normalize_is_idempotent(declared in arb_plan(), reported in arb_plan()) {
        let once = normalize_plan(&declared, &reported);
        prop_assert_eq!(normalize_plan(&declared, &once), once);
    }

    /// Requesting a bare service and reading it back shows no drift
    #[test]
    fn bare_service_reads_back_unchanged(service in arb_service(), qualifier in "[a-z0-9-]{1,12}") {
        let reported = format!("{service}:{qualifier}");
        prop_assert_eq!(normalize_plan(&service, &reported), service);
    }
}

proptest! {
    /// Add-on records survive the attribute table
    #[test]
    fn addon_record_roundtrip(record in arb_record()) {
        let attrs = record.to_attributes();
        let restored = AddonRecord::from_attributes(&record.id, &attrs).unwrap();
        prop_assert_eq!(restored, record);
    }
}
