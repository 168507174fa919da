use crate::pointer::{navigate, Location, SchemaRef};
use crate::{InstantiateError, SchemaLookup};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};

/// Resolves `reference` against `base_schema_id` into a canonical [`Location`].
///
/// Nodes that are nothing but `{"$ref": ...}` are aliases: whenever the walk
/// lands on one (midway or at the end) the alias is followed and the remaining
/// segments continue from its target. The walk stops on a node that has no
/// `$ref`, or has `$ref` next to other keys.
pub fn normalize_ref(
    registry: &dyn SchemaLookup,
    base_schema_id: &str,
    reference: &str,
) -> Result<Location, InstantiateError> {
    let parsed = SchemaRef::parse(reference);
    let mut current = Location::root(parsed.schema_id.as_deref().unwrap_or(base_schema_id));
    let mut pending: VecDeque<String> = parsed.path.into();
    let mut aliases: HashSet<Location> = HashSet::new();

    loop {
        let node = registry
            .lookup(&current.schema_id)
            .and_then(|document| navigate(document, &current.path))
            .ok_or_else(|| InstantiateError::RefNotFound {
                reference: reference.to_string(),
                context: base_schema_id.to_string(),
            })?;

        if let Some(target) = alias_target(node) {
            if !aliases.insert(current.clone()) {
                return Err(InstantiateError::CyclicReference {
                    location: current.to_string(),
                });
            }
            current = SchemaRef::parse(target).resolve_against(&current.schema_id);
            continue;
        }

        match pending.pop_front() {
            Some(segment) => current.path.push(segment),
            None => return Ok(current),
        }
    }
}

/// `Some(target)` when `node` is exactly `{"$ref": "<target>"}`.
fn alias_target(node: &Value) -> Option<&str> {
    let map = node.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("$ref").and_then(Value::as_str)
}
