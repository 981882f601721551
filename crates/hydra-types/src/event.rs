//! Domain events emitted by Operations after they run.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable notification `{ type, payload }`.
///
/// Events have no link back to the intent that produced them beyond
/// what their payload embeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    payload: Value,
}

impl DomainEvent {
    /// Creates an event from a raw type string and payload.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Creates an event for a typed kind.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be encoded.
    pub fn of<K: EventKind>(payload: &K::Payload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(K::TYPE, serde_json::to_value(payload)?))
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Decodes the payload of a typed kind.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error if the payload does not match.
    pub fn decode<K: EventKind>(&self) -> Result<K::Payload, serde_json::Error> {
        K::Payload::deserialize(&self.payload)
    }

    #[must_use]
    pub fn is<K: EventKind>(&self) -> bool {
        self.event_type == K::TYPE
    }
}

/// Static description of one event type.
pub trait EventKind {
    /// The subscription string, e.g. `"project:opened"`.
    const TYPE: &'static str;

    /// Payload shape.
    type Payload: Serialize + DeserializeOwned;
}
