use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted schema definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSchema {
    pub id: i64,
    pub name: String,
    pub version: u32,
    pub definition: Value,
    pub created_at: DateTime<Utc>,
}

/// An event waiting to be appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub schema_name: String,
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub payload: Value,
}

impl NewEvent {
    pub fn new(schema_name: impl Into<String>, schema_version: u32, payload: Value) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_version,
            entity_id: None,
            event_type: None,
            payload,
        }
    }

    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }
}

/// An appended event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub schema_name: String,
    pub schema_version: u32,
    pub entity_id: Option<String>,
    pub event_type: Option<String>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}
