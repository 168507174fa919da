//! Expansion of `{"$ref": ...}` markers embedded in literal `default` values.
//!
//! This is a convention layered on top of JSON Schema, not standard `$ref`
//! semantics: it only runs when `resolve_default_refs` is enabled, and it walks
//! the produced value rather than the schema.

use crate::merge::merge_sibling_keys;
use crate::pointer::Location;
use crate::resolver::{Instantiation, Resolver};
use serde_json::{Map, Value};

impl Resolver<'_> {
    /// Returns `value` with every embedded `$ref` object replaced by the default
    /// of the node it points to. References are resolved against `at`'s
    /// document; sibling keys of the marker override the resolved value.
    pub(crate) fn maybe_resolve_refs(&mut self, value: &Value, at: &Location) -> Instantiation {
        match value {
            Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
                Some(reference) => {
                    tracing::debug!(location = %at, reference, "expanding $ref inside default");
                    let resolved = self.resolve_ref(reference, &Map::new(), at)?;
                    let replacement = merge_sibling_keys(&resolved, map);
                    self.expand_children(&replacement, at)
                }
                None => self.expand_children(value, at),
            },
            Value::Array(_) => self.expand_children(value, at),
            other => Ok(other.clone()),
        }
    }

    fn expand_children(&mut self, value: &Value, at: &Location) -> Instantiation {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.maybe_resolve_refs(child, &at.child(key))?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.maybe_resolve_refs(item, &at.child(index)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}
