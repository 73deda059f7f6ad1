use serde_json::Value;

use crate::error::Result;
use crate::record::{Event, NewEvent, StoredSchema};

/// Storage for schema definitions and an append-only event log.
///
/// Schemas are unique per `(name, version)` and never change once stored.
/// Event ids increase strictly with every append.
pub trait Store: Send + Sync {
    /// Store a schema definition, returning its row id.
    fn add_schema(&self, name: &str, version: u32, definition: &Value) -> Result<i64>;

    /// Fetch a stored schema by name and version.
    fn get_schema(&self, name: &str, version: u32) -> Result<Option<StoredSchema>>;

    /// Append an event, returning its id.
    fn store_event(&self, event: NewEvent) -> Result<i64>;

    /// Events recorded for an entity, oldest first.
    fn query_events_by_entity(&self, entity_id: &str) -> Result<Vec<Event>>;
}
