//! Property tests for the metadata locator
//!
//! Random package objects (strings full of braces, quotes and backslashes,
//! nested arrays and objects) are serialized into an index and must come
//! back out byte for byte.

use depsolve_core::locator::{LocateError, locate};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z{}\\[\\]\"\\\\ :,]{0,12}".prop_map(Value::String),
    ]
}

fn to_object(map: BTreeMap<String, Value>) -> Value {
    Value::Object(map.into_iter().collect::<Map<String, Value>>())
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z{}\"]{1,6}", inner, 0..4).prop_map(to_object),
        ]
    })
}

fn package_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z{}\"]{1,6}", json_value(), 0..5).prop_map(to_object)
}

fn packages() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map("[a-z]{1,8}-[0-9]\\.[0-9]\\.json", package_object(), 1..6)
}

/// `{"info":{"packages":{...}},"packages":{...}}` with a decoy nested anchor.
fn index(packages: &BTreeMap<String, Value>) -> String {
    let entries: Vec<String> = packages
        .iter()
        .map(|(key, value)| format!("{}:{}", Value::String(key.clone()), value))
        .collect();
    format!(
        r#"{{"info":{{"packages":{{"decoy":1}}}},"packages":{{{}}}}}"#,
        entries.join(",")
    )
}

proptest! {
    /// Every package comes back exactly as serialized
    #[test]
    fn located_value_is_verbatim(packages in packages()) {
        let document = index(&packages);
        for (key, value) in &packages {
            let found = locate(&document, key).expect("key should be found");
            prop_assert_eq!(found, value.to_string());
        }
    }

    /// Pretty-printed indexes give back a slice that parses to the same object
    #[test]
    fn located_value_parses_back(packages in packages()) {
        let mut root = Map::new();
        root.insert("packages".to_string(), to_object(packages.clone()));
        let document = serde_json::to_string_pretty(&Value::Object(root)).unwrap();

        for (key, value) in &packages {
            let found = locate(&document, key).expect("key should be found");
            let braced = found.starts_with('{') && found.ends_with('}');
            prop_assert!(braced, "located value is not an object: {}", found);
            let parsed: Value = serde_json::from_str(found).unwrap();
            prop_assert_eq!(&parsed, value);
        }
    }

    /// A key that is not present is reported as missing, never as a match
    #[test]
    fn missing_key_is_not_found(packages in packages()) {
        let document = index(&packages);
        let result = locate(&document, "ABSENT.json");
        prop_assert_eq!(
            result,
            Err(LocateError::KeyNotFound { key: "ABSENT.json".to_string() })
        );
    }
}
