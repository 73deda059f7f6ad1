use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use beacon_core::{Outcome, Schema};
use serde_json::Value;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::definition::SchemaDefinition;
use crate::error::{Result, SchemaError};

const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Identity of a registered schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey {
    pub name: String,
    pub version: u32,
}

impl SchemaKey {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// File name this schema is loaded from in a schema directory.
    pub fn file_name(&self) -> String {
        format!("{}.v{}{SCHEMA_FILE_SUFFIX}", self.name, self.version)
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

struct RegisteredSchema {
    definition: SchemaDefinition,
    schema: Schema,
}

/// Compiled schemas keyed by name and version.
pub struct SchemaRegistry {
    schemas: BTreeMap<SchemaKey, RegisteredSchema>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: BTreeMap::new(),
            config,
        }
    }

    /// Register a schema from a JSON definition string.
    pub fn register(&mut self, definition_json: &str) -> Result<SchemaKey> {
        let definition = SchemaDefinition::from_json(definition_json)?;
        self.register_definition(definition)
    }

    /// Register a schema from a JSON definition value.
    pub fn register_value(&mut self, definition: &Value) -> Result<SchemaKey> {
        let definition = SchemaDefinition::from_value(definition)?;
        self.register_definition(definition)
    }

    /// Compile and register a parsed definition, replacing any schema already
    /// registered under the same name and version.
    pub fn register_definition(&mut self, definition: SchemaDefinition) -> Result<SchemaKey> {
        let schema = definition.compile(self.config.schema_config())?;
        Ok(self.insert(definition, schema))
    }

    /// Add a definition that was already compiled against this registry's
    /// config, replacing any schema with the same key.
    pub fn insert(&mut self, definition: SchemaDefinition, schema: Schema) -> SchemaKey {
        let key = SchemaKey::new(definition.name.clone(), definition.version);

        debug!(schema = %key, fields = schema.len(), "registered schema");
        let replaced = self
            .schemas
            .insert(key.clone(), RegisteredSchema { definition, schema });
        if replaced.is_some() {
            debug!(schema = %key, "replaced previously registered schema");
        }
        key
    }

    /// Load schemas from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load schemas from a directory with explicit config.
    ///
    /// Files must be named `<name>.v<version>.schema.json` and agree with the
    /// name and version inside the definition. Other files are ignored.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        let mut loaded_schema_count = 0usize;

        let entries = std::fs::read_dir(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

        for entry in entries {
            let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.to_ascii_lowercase().ends_with(SCHEMA_FILE_SUFFIX) {
                continue;
            }

            let entry_path = entry.path();
            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();
            if file_type.is_symlink() {
                return Err(SchemaError::LoadFailed(format!(
                    "refusing to load schema symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            let expected = parse_schema_file_name(&file_name).ok_or_else(|| {
                SchemaError::LoadFailed(format!("unrecognized schema filename: {file_name}"))
            })?;

            loaded_schema_count = loaded_schema_count.saturating_add(1);
            if loaded_schema_count > registry.config.max_schemas_from_directory {
                return Err(SchemaError::LoadFailed(format!(
                    "schema count exceeds configured max ({}): {}",
                    registry.config.max_schemas_from_directory, loaded_schema_count
                )));
            }

            let content = read_schema_file(&entry_path, &path_metadata, &registry.config)?;
            let definition = SchemaDefinition::from_json(&content).map_err(|err| {
                SchemaError::LoadFailed(format!("{file_name}: {err}"))
            })?;
            let key = SchemaKey::new(definition.name.clone(), definition.version);
            if key != expected {
                return Err(SchemaError::LoadFailed(format!(
                    "{file_name} defines {key}, expected {expected}"
                )));
            }

            registry.register_definition(definition)?;
        }

        debug!(
            path = %path.display(),
            count = registry.schemas.len(),
            "loaded schema directory"
        );
        Ok(registry)
    }

    /// Load from embedded definition strings.
    pub fn from_embedded(definitions: &[&str]) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Compiled schema for an exact name and version.
    pub fn get(&self, name: &str, version: u32) -> Option<&Schema> {
        self.lookup(name, version).map(|registered| &registered.schema)
    }

    /// Definition a schema was compiled from.
    pub fn definition(&self, name: &str, version: u32) -> Option<&SchemaDefinition> {
        self.lookup(name, version)
            .map(|registered| &registered.definition)
    }

    /// Highest registered version of `name`.
    pub fn latest(&self, name: &str) -> Option<(u32, &Schema)> {
        self.schemas
            .iter()
            .rev()
            .find(|(key, _)| key.name == name)
            .map(|(key, registered)| (key.version, &registered.schema))
    }

    /// Check if a schema is registered.
    pub fn has_schema(&self, name: &str, version: u32) -> bool {
        self.lookup(name, version).is_some()
    }

    /// Registered schema keys, sorted by name then version.
    pub fn schemas(&self) -> Vec<SchemaKey> {
        self.schemas.keys().cloned().collect()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Validate a document against a registered schema.
    ///
    /// Unknown schemas pass unless `fail_on_missing_schema` is set.
    pub fn validate(&self, name: &str, version: u32, document: &Value) -> Result<Outcome> {
        match self.get(name, version) {
            Some(schema) => Ok(schema.validate(document)),
            None if self.config.fail_on_missing_schema => Err(SchemaError::NoSchema {
                name: name.to_string(),
                version,
            }),
            None => Ok(Outcome::ok()),
        }
    }

    /// Parse `payload` as JSON and validate it against a registered schema.
    pub fn validate_payload(&self, name: &str, version: u32, payload: &[u8]) -> Result<Outcome> {
        let document: Value = serde_json::from_slice(payload)?;
        self.validate(name, version, &document)
    }

    fn lookup(&self, name: &str, version: u32) -> Option<&RegisteredSchema> {
        self.schemas.get(&SchemaKey::new(name, version))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

fn read_schema_file(
    entry_path: &Path,
    path_metadata: &std::fs::Metadata,
    config: &RegistryConfig,
) -> Result<String> {
    let file_name = entry_path.display();
    let file = std::fs::File::open(entry_path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {file_name}: {err}"))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(path_metadata, &opened_metadata) {
            return Err(SchemaError::LoadFailed(format!(
                "schema file changed during load: {file_name}"
            )));
        }
    }
    #[cfg(not(unix))]
    let _ = path_metadata;

    let max_bytes = config.max_schema_file_size;
    if opened_metadata.len() > max_bytes as u64 {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large ({} bytes): {file_name}",
            opened_metadata.len()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading schema {file_name}: {err}"))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large while reading: {file_name}"
        )));
    }
    Ok(content)
}

/// `user.v3.schema.json` -> `user v3`.
fn parse_schema_file_name(file_name: &str) -> Option<SchemaKey> {
    let stem = file_name.get(..file_name.len().checked_sub(SCHEMA_FILE_SUFFIX.len())?)?;
    let (name, version) = stem.rsplit_once(".v")?;
    if name.is_empty() {
        return None;
    }
    let version = version.parse::<u32>().ok()?;
    Some(SchemaKey::new(name, version))
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
