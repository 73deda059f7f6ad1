//! Persistence boundary for schemas and append-only events.
//!
//! [`Store`] is the contract a database adapter fulfils; [`MemoryStore`] is an
//! in-process implementation of it. [`Ingestor`] sits in front of a store and
//! only appends events whose payload passes the referenced schema.

pub mod error;
pub mod ingest;
pub mod memory;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use ingest::Ingestor;
pub use memory::MemoryStore;
pub use record::{Event, NewEvent, StoredSchema};
pub use store::Store;
