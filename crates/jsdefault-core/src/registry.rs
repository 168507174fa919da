use crate::RegistryError;
use serde_json::Value;
use std::collections::HashMap;

/// Read-only view of schema documents keyed by schema id.
///
/// Resolution only ever queries through this trait, so callers may bring
/// their own store instead of [`SchemaRegistry`].
pub trait SchemaLookup {
    fn lookup(&self, schema_id: &str) -> Option<&Value>;
}

impl SchemaLookup for HashMap<String, Value> {
    fn lookup(&self, schema_id: &str) -> Option<&Value> {
        self.get(schema_id)
    }
}

/// In-memory schema store. Populate it up front, then hand out `&SchemaRegistry`
/// to every instantiation call.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    documents: HashMap<String, Value>,
    validate: bool,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Empty registry that meta-validates documents on [`register`](Self::register).
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            validate: true,
        }
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    pub fn without_validation(self) -> Self {
        self.with_validation(false)
    }

    pub fn from_documents<I>(documents: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut registry = Self::new();
        registry.register_all(documents)?;
        Ok(registry)
    }

    /// Adds one document under its self-declared id and returns that id.
    pub fn register(&mut self, document: Value) -> Result<String, RegistryError> {
        if !document.is_object() {
            return Err(RegistryError::NotAnObject);
        }
        let schema_id = document_id(&document)
            .ok_or(RegistryError::MissingId)?
            .to_string();
        if self.documents.contains_key(&schema_id) {
            return Err(RegistryError::DuplicateId(schema_id));
        }
        if self.validate {
            meta_validate(&document).map_err(|message| RegistryError::InvalidSchema {
                schema_id: schema_id.clone(),
                message,
            })?;
        }
        tracing::debug!(schema_id = %schema_id, "registered schema document");
        self.documents.insert(schema_id.clone(), document);
        Ok(schema_id)
    }

    /// Adds documents in order, stopping at the first rejected one.
    pub fn register_all<I>(&mut self, documents: I) -> Result<Vec<String>, RegistryError>
    where
        I: IntoIterator<Item = Value>,
    {
        documents
            .into_iter()
            .map(|document| self.register(document))
            .collect()
    }

    pub fn lookup(&self, schema_id: &str) -> Option<&Value> {
        self.documents.get(schema_id)
    }

    pub fn contains(&self, schema_id: &str) -> bool {
        self.documents.contains_key(schema_id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SchemaLookup for SchemaRegistry {
    fn lookup(&self, schema_id: &str) -> Option<&Value> {
        SchemaRegistry::lookup(self, schema_id)
    }
}

/// Dialect assumed for documents that do not declare `$schema`.
pub const DEFAULT_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

/// Checks `document` against the meta-schema of its declared dialect, or of
/// draft-07 when it declares none (tuple-form `items` is valid there).
fn meta_validate(document: &Value) -> Result<(), String> {
    if document.get("$schema").is_some() {
        return jsonschema::meta::validate(document).map_err(|err| err.to_string());
    }
    let mut dialected = document.clone();
    if let Some(map) = dialected.as_object_mut() {
        map.insert("$schema".into(), DEFAULT_DIALECT.into());
    }
    jsonschema::meta::validate(&dialected).map_err(|err| err.to_string())
}

/// Self-declared id of a document: `$id`, else draft-04 `id`, minus any trailing `#`.
pub fn document_id(document: &Value) -> Option<&str> {
    ["$id", "id"]
        .iter()
        .filter_map(|key| document.get(*key).and_then(Value::as_str))
        .map(|id| id.trim_end_matches('#'))
        .find(|id| !id.is_empty())
}
