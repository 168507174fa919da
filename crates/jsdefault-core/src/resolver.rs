//! Recursive default derivation over schema nodes.
//!
//! A node is interpreted by the first matching rule, in this order:
//! `default`, `$ref`, `allOf`, `const`, `enum`, then `type`. The rules are
//! mutually exclusive; a node with both `default` and `$ref` never looks at
//! the reference.

use crate::merge::{accumulate, merge_sibling_keys};
use crate::normalize::normalize_ref;
use crate::pointer::{navigate, Location};
use crate::{InstantiateError, InstantiateOptions, SchemaLookup};
use serde_json::{json, Map, Value};

/// Outcome of resolving one node: `Ok` is a present value, `Err` an absence
/// together with its reason.
pub type Instantiation = Result<Value, InstantiateError>;

/// The `type` keywords that have a derivation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl SchemaType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// Canonical empty literal of the type.
    pub fn empty_value(self) -> Value {
        match self {
            Self::Object => json!({}),
            Self::Array => json!([]),
            Self::String => json!(""),
            Self::Integer | Self::Number => json!(0),
            Self::Boolean => json!(false),
            Self::Null => Value::Null,
        }
    }
}

/// Which rule decides a node, with the payload that rule needs.
#[derive(Debug)]
enum NodeRule<'a> {
    Default(&'a Value),
    Ref(&'a str, &'a Map<String, Value>),
    AllOf(&'a [Value]),
    Const(&'a Value),
    Enum(&'a Value),
    Typed(SchemaType),
    Unknown(Option<String>),
}

impl<'a> NodeRule<'a> {
    fn classify(node: &'a Value) -> Self {
        let Some(map) = node.as_object() else {
            return Self::Unknown(None);
        };
        if let Some(value) = map.get("default") {
            return Self::Default(value);
        }
        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return Self::Ref(reference, map);
        }
        if let Some(branches) = map.get("allOf").and_then(Value::as_array) {
            return Self::AllOf(branches);
        }
        if let Some(value) = map.get("const") {
            return Self::Const(value);
        }
        if let Some(first) = map
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|values| values.first())
        {
            return Self::Enum(first);
        }
        match map.get("type") {
            Some(Value::String(keyword)) => SchemaType::from_keyword(keyword)
                .map(Self::Typed)
                .unwrap_or_else(|| Self::Unknown(Some(keyword.clone()))),
            Some(Value::Array(keywords)) => keywords
                .iter()
                .filter_map(Value::as_str)
                .find_map(SchemaType::from_keyword)
                .map(Self::Typed)
                .unwrap_or_else(|| Self::Unknown(Some(Value::Array(keywords.clone()).to_string()))),
            _ => Self::Unknown(None),
        }
    }
}

/// State for one top-level instantiation call. Never shared between calls.
pub(crate) struct Resolver<'r> {
    registry: &'r dyn SchemaLookup,
    resolve_default_refs: bool,
    required_only: bool,
    max_depth: usize,
    max_array_items: usize,
    depth: usize,
    /// `$ref` targets currently being resolved, outermost first.
    active: Vec<Location>,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r dyn SchemaLookup, options: &InstantiateOptions<'_>) -> Self {
        Self {
            registry,
            resolve_default_refs: options.resolve_default_refs,
            required_only: options.required_only,
            max_depth: options.max_depth,
            max_array_items: options.max_array_items,
            depth: 0,
            active: Vec::new(),
        }
    }

    /// Resolves `node`, found at `at`, to its default value.
    pub(crate) fn resolve(&mut self, node: &Value, at: &Location) -> Instantiation {
        if self.depth >= self.max_depth {
            return Err(InstantiateError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.dispatch(node, at);
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, node: &Value, at: &Location) -> Instantiation {
        let rule = NodeRule::classify(node);
        tracing::trace!(location = %at, ?rule, "resolving schema node");
        match rule {
            NodeRule::Default(value) if self.resolve_default_refs => {
                self.maybe_resolve_refs(value, &at.child("default"))
            }
            NodeRule::Default(value) => Ok(value.clone()),
            NodeRule::Ref(reference, map) => self.resolve_ref(reference, map, at),
            NodeRule::AllOf(branches) => self.resolve_all_of(branches, at),
            NodeRule::Const(value) | NodeRule::Enum(value) => Ok(value.clone()),
            NodeRule::Typed(SchemaType::Object) => self.resolve_object(node, at),
            NodeRule::Typed(SchemaType::Array) => self.resolve_array(node, at),
            NodeRule::Typed(scalar) => Ok(scalar.empty_value()),
            NodeRule::Unknown(found) => Err(InstantiateError::UnknownType {
                location: at.to_string(),
                found,
            }),
        }
    }

    /// Follows `reference` (relative to `at`'s document), overlays the keys
    /// written next to it, and resolves the result in the target's document.
    ///
    /// The top-level entry goes through here too, with no sibling keys.
    pub(crate) fn resolve_ref(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        at: &Location,
    ) -> Instantiation {
        let target = normalize_ref(self.registry, &at.schema_id, reference)?;
        if self.active.contains(&target) {
            return Err(InstantiateError::CyclicReference {
                location: target.to_string(),
            });
        }
        let registry = self.registry;
        let resolved = registry
            .lookup(&target.schema_id)
            .and_then(|document| navigate(document, &target.path))
            .ok_or_else(|| InstantiateError::RefNotFound {
                reference: reference.to_string(),
                context: at.schema_id.clone(),
            })?;
        tracing::debug!(from = %at, reference, target = %target, "following $ref");
        let merged = merge_sibling_keys(resolved, node);
        self.enter(target, |this, target| this.resolve(&merged, target))
    }

    /// Runs `body` with `target` marked as in progress.
    fn enter<F>(&mut self, target: Location, body: F) -> Instantiation
    where
        F: FnOnce(&mut Self, &Location) -> Instantiation,
    {
        self.active.push(target.clone());
        let result = body(self, &target);
        self.active.pop();
        result
    }

    fn resolve_all_of(&mut self, branches: &[Value], at: &Location) -> Instantiation {
        let mut acc = Value::Object(Map::new());
        for (index, branch) in branches.iter().enumerate() {
            let value = self.resolve(branch, &at.child("allOf").child(index))?;
            accumulate(&mut acc, value);
        }
        Ok(acc)
    }

    fn resolve_object(&mut self, node: &Value, at: &Location) -> Instantiation {
        let properties = node.get("properties").and_then(Value::as_object);
        let required: Vec<&str> = node
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if let Some(missing) = required
            .iter()
            .find(|name| !properties.is_some_and(|props| props.contains_key(**name)))
        {
            return Err(InstantiateError::MissingRequiredValue {
                property: missing.to_string(),
                location: at.to_string(),
            });
        }

        let mut out = Map::new();
        for (name, schema) in properties.into_iter().flatten() {
            let is_required = required.contains(&name.as_str());
            let has_own_default = schema.get("default").is_some();
            if !is_required && (self.required_only || !has_own_default) {
                continue;
            }
            let value = self.resolve(schema, &at.child("properties").child(name))?;
            out.insert(name.clone(), value);
        }
        Ok(Value::Object(out))
    }

    fn resolve_array(&mut self, node: &Value, at: &Location) -> Instantiation {
        let min_items = node.get("minItems").and_then(Value::as_u64).unwrap_or(0);
        match node.get("items") {
            Some(Value::Array(positional)) => positional
                .iter()
                .enumerate()
                .map(|(index, item)| self.resolve(item, &at.child("items").child(index)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(item) if min_items > 0 => {
                let count = usize::try_from(min_items)
                    .ok()
                    .filter(|count| *count <= self.max_array_items)
                    .ok_or_else(|| InstantiateError::ArrayLimitExceeded {
                        location: at.to_string(),
                        requested: min_items,
                        limit: self.max_array_items,
                    })?;
                let value = self.resolve(item, &at.child("items"))?;
                Ok(Value::Array(vec![value; count]))
            }
            _ => Ok(Value::Array(Vec::new())),
        }
    }
}
