/// Errors that can occur while loading or compiling schema definitions.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The embedded definition meta-schema could not be compiled.
    #[error("failed to compile definition meta-schema: {0}")]
    CompileFailed(String),

    /// The definition document does not describe a valid schema.
    #[error("invalid schema definition: {0}")]
    InvalidDefinition(String),

    /// Rule definitions nest deeper than the configured budget.
    #[error("schema definition nests deeper than {limit} levels")]
    DefinitionTooDeep { limit: usize },

    /// The input is not valid JSON.
    #[error("input is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No schema registered under the given name and version.
    #[error("no schema registered for {name} v{version}")]
    NoSchema { name: String, version: u32 },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
