use beacon_core::Outcome;
use beacon_schema::SchemaError;

/// Errors raised by stores and the ingestion path.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A schema with this name and version is already stored.
    #[error("schema {name} v{version} already exists")]
    DuplicateSchema { name: String, version: u32 },

    /// The referenced schema is neither stored nor registered.
    #[error("unknown schema {name} v{version}")]
    UnknownSchema { name: String, version: u32 },

    /// The event payload failed validation and was not stored.
    #[error("payload rejected by {name} v{version}: {outcome}")]
    Rejected {
        name: String,
        version: u32,
        outcome: Outcome,
    },

    /// The stored definition could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A previous writer panicked while holding the store lock.
    #[error("store state poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
