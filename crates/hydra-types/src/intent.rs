//! Intent: the one inbound command shape the engine routes on.
//!
//! An [`Intent`] names exactly one Operation through its type string and
//! carries that Operation's whole input as a JSON payload. Once built it
//! cannot be mutated in place: an interceptor that wants to rewrite it
//! returns a new value.
//!
//! # Typed access
//!
//! The engine routes on strings, callers work with types. An
//! [`IntentKind`] ties a type string to its payload and result types:
//!
//! ```
//! use hydra_types::{Intent, IntentKind};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Rename {
//!     to: String,
//! }
//!
//! struct RenameWorkspace;
//!
//! impl IntentKind for RenameWorkspace {
//!     const TYPE: &'static str = "workspace:rename";
//!     type Payload = Rename;
//!     type Output = bool;
//! }
//!
//! let intent = Intent::of::<RenameWorkspace>(&Rename { to: "feat".into() }).unwrap();
//! assert!(intent.is::<RenameWorkspace>());
//! assert_eq!(intent.payload()["to"], "feat");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An immutable command value `{ type, payload }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    intent_type: String,
    #[serde(default)]
    payload: Value,
}

impl Intent {
    /// Creates an intent from a raw type string and payload.
    pub fn new(intent_type: impl Into<String>, payload: Value) -> Self {
        Self {
            intent_type: intent_type.into(),
            payload,
        }
    }

    /// Creates an intent for a typed kind.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be encoded.
    pub fn of<K: IntentKind>(payload: &K::Payload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(K::TYPE, serde_json::to_value(payload)?))
    }

    /// The type string that selects the Operation.
    #[must_use]
    pub fn intent_type(&self) -> &str {
        &self.intent_type
    }

    /// The raw payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error if the payload does not have the
    /// expected shape.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Returns `true` if this intent has the type of `K`.
    #[must_use]
    pub fn is<K: IntentKind>(&self) -> bool {
        self.intent_type == K::TYPE
    }

    /// Returns a copy of this intent carrying a different payload.
    ///
    /// Used by interceptors that normalize input before it reaches the
    /// Operation.
    #[must_use]
    pub fn with_payload(&self, payload: Value) -> Self {
        Self::new(self.intent_type.clone(), payload)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.intent_type)
    }
}

/// Static description of one intent type.
///
/// `Output` is the phantom result type: the engine itself only moves
/// JSON, typed callers decode through it.
pub trait IntentKind {
    /// The routing string, e.g. `"project:open"`.
    const TYPE: &'static str;

    /// Payload shape.
    type Payload: Serialize + DeserializeOwned;

    /// Result shape returned by the Operation.
    type Output: Serialize + DeserializeOwned;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Ping;

    impl IntentKind for Ping {
        const TYPE: &'static str = "test:ping";
        type Payload = Value;
        type Output = String;
    }

    #[test]
    fn wire_shape_uses_type_key() {
        let intent = Intent::new("test:ping", json!({"n": 1}));
        let encoded = serde_json::to_value(&intent).expect("intent should serialize");
        assert_eq!(encoded, json!({"type": "test:ping", "payload": {"n": 1}}));
    }

    #[test]
    fn missing_payload_defaults_to_null() {
        let intent: Intent =
            serde_json::from_value(json!({"type": "test:ping"})).expect("intent should parse");
        assert_eq!(intent.payload(), &Value::Null);
        assert!(intent.is::<Ping>());
    }

    #[test]
    fn with_payload_keeps_type() {
        let intent = Intent::new("test:ping", json!(1));
        let rewritten = intent.with_payload(json!(2));
        assert_eq!(rewritten.intent_type(), "test:ping");
        assert_eq!(rewritten.payload(), &json!(2));
        assert_eq!(intent.payload(), &json!(1));
    }

    #[test]
    fn payload_as_reports_shape_errors() {
        let intent = Intent::new("test:ping", json!({"n": "not a number"}));

        #[derive(Debug, Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            n: u32,
        }

        assert!(intent.payload_as::<Expected>().is_err());
    }

    #[test]
    fn display_is_type() {
        assert_eq!(Intent::new("ui:set-mode", Value::Null).to_string(), "ui:set-mode");
    }
}
