//! Default instances from JSON Schema documents.
//!
//! Given a populated [`SchemaRegistry`] and a schema id, [`instantiate`] walks
//! the schema and produces the value a conforming document would have if every
//! field took its declared default, with required fields lacking one filled in
//! by a type-appropriate empty value.
//!
//! Supported keywords: `$ref`, `allOf`, `type`, `properties`, `required`,
//! `items`, `minItems`, `default`, `const`, `enum`.
//!
//! ```
//! use jsdefault_core::{instantiate, InstantiateOptions, SchemaRegistry};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(json!({
//!         "$id": "point.json",
//!         "type": "object",
//!         "required": ["x"],
//!         "properties": {
//!             "x": {"type": "integer"},
//!             "label": {"type": "string", "default": "origin"}
//!         }
//!     }))
//!     .unwrap();
//!
//! let value = instantiate(&InstantiateOptions::new(&registry), "point.json").unwrap();
//! assert_eq!(value, json!({"x": 0, "label": "origin"}));
//! ```

pub mod config;
mod error;
mod expand;
mod merge;
mod normalize;
mod options;
pub mod pointer;
mod registry;
mod resolver;

pub use error::{InstantiateError, RegistryError};
pub use merge::{deep_merge, merge_sibling_keys};
pub use normalize::normalize_ref;
pub use options::{InstantiateOptions, DEFAULT_MAX_ARRAY_ITEMS, DEFAULT_MAX_DEPTH};
pub use pointer::{parse_ref, Location, SchemaRef};
pub use registry::{document_id, SchemaLookup, SchemaRegistry, DEFAULT_DIALECT};
pub use resolver::{Instantiation, SchemaType};

use resolver::Resolver;
use serde_json::{json, Map};

/// Derives the default instance of `schema_id_or_ref`.
///
/// `schema_id_or_ref` is a schema id (`message.json`) or a reference into one
/// (`definitions.json#/header`). When the document part is not registered the
/// result is an empty object; every other failure is returned as an error.
///
/// Each call is independent: nothing is cached, and identical inputs yield
/// identical output.
pub fn instantiate(options: &InstantiateOptions<'_>, schema_id_or_ref: &str) -> Instantiation {
    let registry = options.registry.ok_or_else(|| {
        InstantiateError::InvalidOptions("a schema registry must be supplied".to_string())
    })?;
    let entry = SchemaRef::parse(schema_id_or_ref);
    let Some(schema_id) = entry.schema_id.as_deref() else {
        tracing::debug!(reference = schema_id_or_ref, "entry reference names no document");
        return Ok(json!({}));
    };
    if registry.lookup(schema_id).is_none() {
        tracing::debug!(schema_id, "schema not registered; instantiating empty object");
        return Ok(json!({}));
    }
    Resolver::new(registry, options).resolve_ref(
        schema_id_or_ref,
        &Map::new(),
        &Location::root(schema_id),
    )
}
