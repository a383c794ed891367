//! # Protocol Entities
//!
//! The event record pushed by the coordinating server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single protocol event as delivered inside a transaction.
///
/// The payload is kept as raw JSON. Only the `type` field has meaning to the
/// core: it selects the per-type dispatch channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    /// Wrap a raw JSON value.
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The declared event type.
    ///
    /// Returns `None` when the field is absent, not a string, or empty.
    pub fn event_type(&self) -> Option<&str> {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }

    /// The event id, when the partner supplied one.
    pub fn event_id(&self) -> Option<&str> {
        self.0.get("event_id").and_then(Value::as_str)
    }

    /// The room the event belongs to, when present.
    pub fn room_id(&self) -> Option<&str> {
        self.0.get("room_id").and_then(Value::as_str)
    }

    /// Look up an arbitrary top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the raw JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the event, returning the raw JSON.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Event {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}
