use crate::{
    InstantiateOptions, SchemaLookup, SchemaRegistry, DEFAULT_MAX_ARRAY_ITEMS, DEFAULT_MAX_DEPTH,
};
use anyhow::{Context, Result};
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema id under which [`config_schema_json`] is registered for self-instantiation.
pub const CONFIG_SCHEMA_ID: &str = "jsdefault-config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct InstantiateConfig {
    /// Expand `$ref` objects embedded in literal `default` values.
    pub resolve_default_refs: bool,
    /// Only build required properties.
    pub required_only: bool,
    /// Maximum resolver nesting before giving up.
    #[schemars(range(min = 1))]
    pub max_depth: usize,
    /// Most items a `minItems` array may be filled with.
    pub max_array_items: usize,
}

impl Default for InstantiateConfig {
    fn default() -> Self {
        Self {
            resolve_default_refs: false,
            required_only: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_items: DEFAULT_MAX_ARRAY_ITEMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Schema files or directories to load.
    pub paths: Vec<String>,
    /// Meta-validate documents as they are registered.
    pub validate: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            validate: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct InstantiatorConfig {
    pub instantiate: InstantiateConfig,
    pub registry: RegistryConfig,
}

impl InstantiatorConfig {
    /// Empty registry honouring `registry.validate`.
    pub fn registry(&self) -> SchemaRegistry {
        SchemaRegistry::new().with_validation(self.registry.validate)
    }

    pub fn options<'r>(&self, registry: &'r dyn SchemaLookup) -> InstantiateOptions<'r> {
        InstantiateOptions::new(registry)
            .with_resolve_default_refs(self.instantiate.resolve_default_refs)
            .with_required_only(self.instantiate.required_only)
            .with_max_depth(self.instantiate.max_depth)
            .with_max_array_items(self.instantiate.max_array_items)
    }
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema = schemars::schema_for!(InstantiatorConfig);
    let schema_value = serde_json::to_value(&schema).expect("schema value");
    validator_for(&schema_value).expect("valid schema")
});

/// Returns the JSON schema describing the configuration structure.
///
/// # Panics
///
/// Panics if schema generation fails; this indicates a programming error.
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(InstantiatorConfig);
    let mut value = serde_json::to_value(&schema).expect("schema json");
    if let Some(map) = value.as_object_mut() {
        map.insert("$id".into(), CONFIG_SCHEMA_ID.into());
    }
    value
}

pub fn write_schema_file(path: &Path) -> std::io::Result<()> {
    let schema_json = config_schema_json();
    std::fs::write(path, serde_json::to_string_pretty(&schema_json)?)
}

/// Default configuration, derived by instantiating the configuration's own schema.
pub fn default_config_value() -> Result<serde_json::Value> {
    let mut registry = SchemaRegistry::new();
    registry
        .register(config_schema_json())
        .context("registering configuration schema")?;
    crate::instantiate(&InstantiateOptions::new(&registry), CONFIG_SCHEMA_ID)
        .context("instantiating configuration schema")
}

/// Parses and validates TOML configuration text.
pub fn parse_config(content: &str) -> Result<InstantiatorConfig> {
    let raw: toml::Value = toml::from_str(content)?;
    let json_value = serde_json::to_value(&raw)?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(validation_errors.join(", ")));
    }
    let cfg: InstantiatorConfig = toml::from_str(content)?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<InstantiatorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("invalid config {}", path.display()))
}
