//! JsonSchema shape checks for the types the backend and UI exchange.

use std::collections::BTreeSet;

use roofline_core::{Permissions, Profile, Role};
use schemars::schema_for;

fn keys(value: &serde_json::Value) -> BTreeSet<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

fn strings(value: &serde_json::Value) -> BTreeSet<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn permission_schema_lists_every_flag() {
    let schema = serde_json::to_value(schema_for!(Permissions)).unwrap();
    let expected: BTreeSet<String> = Permissions::for_role(Role::Ops)
        .flags()
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect();

    assert_eq!(keys(&schema["properties"]), expected);
    assert_eq!(strings(&schema["required"]), expected);
}

#[test]
fn profile_schema_requires_only_id_and_role() {
    let schema = serde_json::to_value(schema_for!(Profile)).unwrap();
    let required = strings(&schema["required"]);
    assert_eq!(
        required,
        BTreeSet::from(["id".to_string(), "role".to_string()])
    );
    assert!(keys(&schema["properties"]).contains("org_id"));
}
