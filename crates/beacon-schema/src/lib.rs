//! Schema definitions and a versioned registry.
//!
//! A schema is stored as a JSON definition document (name, version, fields).
//! This crate parses those documents, checks them against an embedded
//! definition meta-schema, compiles them into [`beacon_core::Schema`] values
//! and keeps them in a registry keyed by name and version.

pub mod config;
pub mod definition;
pub mod error;
pub mod registry;

pub use config::RegistryConfig;
pub use definition::{FieldDefinition, RuleDefinition, SchemaDefinition};
pub use error::{Result, SchemaError};
pub use registry::{SchemaKey, SchemaRegistry};
