use crate::SchemaLookup;
use std::fmt;

/// Default ceiling on resolver nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default ceiling on items replicated from `minItems`.
pub const DEFAULT_MAX_ARRAY_ITEMS: usize = 65_536;

/// Per-call configuration. Read-only for the duration of one
/// [`instantiate`](crate::instantiate) call.
#[derive(Clone, Copy)]
pub struct InstantiateOptions<'r> {
    /// Registry to resolve schema ids against. Required.
    pub registry: Option<&'r dyn SchemaLookup>,
    /// Expand `{"$ref": ...}` objects found inside literal `default` values.
    pub resolve_default_refs: bool,
    /// Only build required properties; own defaults of optional ones are ignored.
    pub required_only: bool,
    pub max_depth: usize,
    pub max_array_items: usize,
}

impl Default for InstantiateOptions<'_> {
    fn default() -> Self {
        Self {
            registry: None,
            resolve_default_refs: false,
            required_only: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_items: DEFAULT_MAX_ARRAY_ITEMS,
        }
    }
}

impl<'r> InstantiateOptions<'r> {
    pub fn new(registry: &'r dyn SchemaLookup) -> Self {
        Self {
            registry: Some(registry),
            ..Self::default()
        }
    }

    pub fn with_resolve_default_refs(mut self, enabled: bool) -> Self {
        self.resolve_default_refs = enabled;
        self
    }

    pub fn with_required_only(mut self, enabled: bool) -> Self {
        self.required_only = enabled;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_array_items(mut self, max_array_items: usize) -> Self {
        self.max_array_items = max_array_items;
        self
    }
}

impl fmt::Debug for InstantiateOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstantiateOptions")
            .field("registry", &self.registry.map(|_| "<registry>"))
            .field("resolve_default_refs", &self.resolve_default_refs)
            .field("required_only", &self.required_only)
            .field("max_depth", &self.max_depth)
            .field("max_array_items", &self.max_array_items)
            .finish()
    }
}
