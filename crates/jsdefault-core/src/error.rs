//! Error types for registry population and default instantiation.

use thiserror::Error;

/// Reasons a schema node could not produce a default value.
///
/// Composite nodes (`object`, `allOf`, tuple `array`) never swallow a child
/// failure: the first error met on the resolution path is the one returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiateError {
    /// Target document or pointer segment of a `$ref` does not exist.
    #[error("unresolvable $ref `{reference}` (from schema `{context}`)")]
    RefNotFound {
        /// The reference exactly as written.
        reference: String,
        /// Schema id the reference was resolved against.
        context: String,
    },

    /// A `$ref` chain came back to a node that is still being resolved.
    #[error("cyclic $ref chain revisits `{location}`")]
    CyclicReference { location: String },

    /// The node carries neither a recognised keyword nor a recognised `type`.
    #[error("schema node at `{location}` has no default-bearing keyword or known type{}", describe_type(.found))]
    UnknownType {
        location: String,
        found: Option<String>,
    },

    /// A property listed in `required` has no schema to derive a value from.
    #[error("required property `{property}` at `{location}` is not declared under `properties`")]
    MissingRequiredValue { property: String, location: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Nesting went past the configured `max_depth`.
    #[error("resolution exceeded the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// `minItems` asks for more replicated items than `max_array_items` allows.
    #[error("array at `{location}` requires {requested} items, above the limit of {limit}")]
    ArrayLimitExceeded {
        location: String,
        requested: u64,
        limit: usize,
    },
}

fn describe_type(found: &Option<String>) -> String {
    match found {
        Some(kind) => format!(" (type: {kind})"),
        None => String::new(),
    }
}

impl InstantiateError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RefNotFound { .. } => "REF_NOT_FOUND",
            Self::CyclicReference { .. } => "CYCLIC_REFERENCE",
            Self::UnknownType { .. } => "UNKNOWN_TYPE",
            Self::MissingRequiredValue { .. } => "MISSING_REQUIRED_VALUE",
            Self::InvalidOptions(_) => "INVALID_OPTIONS",
            Self::DepthLimitExceeded { .. } => "DEPTH_LIMIT_EXCEEDED",
            Self::ArrayLimitExceeded { .. } => "ARRAY_LIMIT_EXCEEDED",
        }
    }
}

/// Errors raised while adding documents to a [`crate::SchemaRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("schema document must be a JSON object")]
    NotAnObject,
    #[error("schema document declares neither `$id` nor `id`")]
    MissingId,
    #[error("schema `{0}` is already registered")]
    DuplicateId(String),
    #[error("schema `{schema_id}` is not a valid JSON Schema: {message}")]
    InvalidSchema { schema_id: String, message: String },
}
