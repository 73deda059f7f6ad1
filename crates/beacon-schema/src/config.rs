use beacon_core::{SchemaConfig, DEFAULT_MAX_DEPTH};

/// Controls registry loading and validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, validating against an unknown schema returns `SchemaError::NoSchema`.
    pub fail_on_missing_schema: bool,
    /// Maximum number of schemas loaded from a directory.
    pub max_schemas_from_directory: usize,
    /// Maximum bytes allowed per schema file loaded from a directory.
    pub max_schema_file_size: usize,
    /// Nesting budget for both rule definitions and validated documents.
    pub max_depth: usize,
}

impl RegistryConfig {
    /// Evaluation config handed to every compiled schema.
    pub fn schema_config(&self) -> SchemaConfig {
        SchemaConfig {
            max_depth: self.max_depth,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fail_on_missing_schema: false,
            max_schemas_from_directory: 256,
            max_schema_file_size: 256 * 1024,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
