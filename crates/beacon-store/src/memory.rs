use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::record::{Event, NewEvent, StoredSchema};
use crate::store::Store;

/// In-process [`Store`] backed by vectors behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    schemas: Vec<StoredSchema>,
    events: Vec<Event>,
    next_schema_id: i64,
    next_event_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events appended so far.
    pub fn event_count(&self) -> Result<usize> {
        Ok(self.tables()?.events.len())
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn add_schema(&self, name: &str, version: u32, definition: &Value) -> Result<i64> {
        let mut tables = self.tables()?;
        if tables
            .schemas
            .iter()
            .any(|schema| schema.name == name && schema.version == version)
        {
            return Err(StoreError::DuplicateSchema {
                name: name.to_string(),
                version,
            });
        }

        tables.next_schema_id += 1;
        let id = tables.next_schema_id;
        tables.schemas.push(StoredSchema {
            id,
            name: name.to_string(),
            version,
            definition: definition.clone(),
            created_at: Utc::now(),
        });
        debug!(id, name, version, "stored schema");
        Ok(id)
    }

    fn get_schema(&self, name: &str, version: u32) -> Result<Option<StoredSchema>> {
        let tables = self.tables()?;
        Ok(tables
            .schemas
            .iter()
            .find(|schema| schema.name == name && schema.version == version)
            .cloned())
    }

    fn store_event(&self, event: NewEvent) -> Result<i64> {
        let mut tables = self.tables()?;
        tables.next_event_id += 1;
        let id = tables.next_event_id;
        tables.events.push(Event {
            id,
            schema_name: event.schema_name,
            schema_version: event.schema_version,
            entity_id: event.entity_id,
            event_type: event.event_type,
            payload: event.payload,
            created_at: Utc::now(),
        });
        debug!(id, "stored event");
        Ok(id)
    }

    fn query_events_by_entity(&self, entity_id: &str) -> Result<Vec<Event>> {
        let tables = self.tables()?;
        let mut events: Vec<Event> = tables
            .events
            .iter()
            .filter(|event| event.entity_id.as_deref() == Some(entity_id))
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.created_at, event.id));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use serde_json::json;

    use super::*;

    #[test]
    fn schemas_are_unique_per_version() {
        let store = MemoryStore::new();
        let first = store.add_schema("user", 1, &json!({"a": 1})).unwrap();
        let second = store.add_schema("user", 2, &json!({"a": 2})).unwrap();
        assert!(second > first);

        assert!(matches!(
            store.add_schema("user", 1, &json!({})),
            Err(StoreError::DuplicateSchema { version: 1, .. })
        ));

        let stored = store.get_schema("user", 2).unwrap().unwrap();
        assert_eq!(stored.definition, json!({"a": 2}));
        assert!(store.get_schema("user", 3).unwrap().is_none());
    }

    #[test]
    fn events_are_filtered_and_ordered() {
        let store = MemoryStore::new();
        let a1 = store
            .store_event(NewEvent::new("e", 1, json!({"n": 1})).entity("a"))
            .unwrap();
        store
            .store_event(NewEvent::new("e", 1, json!({"n": 2})).entity("b"))
            .unwrap();
        let a2 = store
            .store_event(
                NewEvent::new("e", 1, json!({"n": 3}))
                    .entity("a")
                    .event_type("updated"),
            )
            .unwrap();
        store.store_event(NewEvent::new("e", 1, json!({}))).unwrap();

        let events = store.query_events_by_entity("a").unwrap();
        let ids: Vec<i64> = events.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![a1, a2]);
        assert_eq!(events[1].event_type.as_deref(), Some("updated"));
        assert!(events[0].created_at <= events[1].created_at);
        assert_eq!(store.event_count().unwrap(), 4);
        assert!(store.query_events_by_entity("zzz").unwrap().is_empty());
    }

    #[test]
    fn concurrent_appends_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .store_event(NewEvent::new("e", 1, json!({ "i": i })).entity("x"))
                        .unwrap()
                })
            })
            .collect();
        let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.query_events_by_entity("x").unwrap().len(), 8);
    }
}
