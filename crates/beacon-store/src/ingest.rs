use beacon_schema::{SchemaDefinition, SchemaKey, SchemaRegistry};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::record::{Event, NewEvent};
use crate::store::Store;

/// Validates events against their schema before they reach the store.
#[derive(Debug)]
pub struct Ingestor<S> {
    registry: SchemaRegistry,
    store: S,
}

impl<S: Store> Ingestor<S> {
    pub fn new(registry: SchemaRegistry, store: S) -> Self {
        Self { registry, store }
    }

    /// Compile a definition, persist it and register it.
    ///
    /// Stored schemas are immutable: a `(name, version)` that already exists
    /// in the store is rejected. The registry only changes once the store
    /// write succeeded.
    pub fn register_schema(&mut self, definition_json: &str) -> Result<SchemaKey> {
        let definition = SchemaDefinition::from_json(definition_json)?;
        if self
            .store
            .get_schema(&definition.name, definition.version)?
            .is_some()
        {
            return Err(StoreError::DuplicateSchema {
                name: definition.name,
                version: definition.version,
            });
        }

        let schema = definition.compile(self.registry.config().schema_config())?;
        let stored = definition.to_value();
        self.store.add_schema(&definition.name, definition.version, &stored)?;
        Ok(self.registry.insert(definition, schema))
    }

    /// Compile a stored schema into the registry.
    pub fn load_schema(&mut self, name: &str, version: u32) -> Result<SchemaKey> {
        let stored = self
            .store
            .get_schema(name, version)?
            .ok_or_else(|| StoreError::UnknownSchema {
                name: name.to_string(),
                version,
            })?;
        Ok(self.registry.register_value(&stored.definition)?)
    }

    /// Validate the event payload and append it when it passes.
    pub fn ingest(&self, event: NewEvent) -> Result<i64> {
        let name = event.schema_name.as_str();
        let version = event.schema_version;
        let schema = self
            .registry
            .get(name, version)
            .ok_or_else(|| StoreError::UnknownSchema {
                name: name.to_string(),
                version,
            })?;

        let outcome = schema.validate(&event.payload);
        if outcome.is_failure() {
            warn!(
                schema = name,
                version,
                path = outcome.path(),
                message = outcome.message(),
                "event rejected"
            );
            return Err(StoreError::Rejected {
                name: name.to_string(),
                version,
                outcome,
            });
        }

        let id = self.store.store_event(event)?;
        debug!(id, "event ingested");
        Ok(id)
    }

    /// Events recorded for an entity, oldest first.
    pub fn events_for(&self, entity_id: &str) -> Result<Vec<Event>> {
        self.store.query_events_by_entity(entity_id)
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
