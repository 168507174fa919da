//! The two merge rules used during resolution.
//!
//! Both are spelled out here instead of leaning on a generic deep merge:
//! arrays and primitive-vs-object collisions are replaced by the overlay,
//! never combined.

use serde_json::{Map, Value};

/// Recursively overlays `overlay` onto `base`. Objects merge key by key with
/// the overlay winning; any non-object on either side is replaced by the overlay.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Every key of `node` except `$ref`.
pub fn sibling_keys(node: &Map<String, Value>) -> Map<String, Value> {
    node.iter()
        .filter(|(key, _)| key.as_str() != "$ref")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Combines a `$ref` target with the keys written next to the `$ref`.
/// Sibling keys take precedence; without siblings the target is returned as-is.
pub fn merge_sibling_keys(resolved: &Value, node: &Map<String, Value>) -> Value {
    let siblings = sibling_keys(node);
    let mut merged = resolved.clone();
    if !siblings.is_empty() {
        deep_merge(&mut merged, &Value::Object(siblings));
    }
    merged
}

/// `allOf` accumulation step: mappings shallow-merge over a mapping accumulator
/// (later keys win); anything else replaces the accumulator outright.
pub fn accumulate(acc: &mut Value, next: Value) {
    match (acc, next) {
        (Value::Object(acc_map), Value::Object(next_map)) => {
            for (key, value) in next_map {
                acc_map.insert(key, value);
            }
        }
        (acc, next) => *acc = next,
    }
}
