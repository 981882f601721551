//! Hook context: the mutable record handed to run-mode handlers.

use crate::{HandlerError, HookError};
use hydra_types::Intent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Per-execution scratch record shared by the handlers of one Operation.
///
/// Created empty (apart from the intent) at the start of an Operation and
/// dropped at its end; it is never shared between operations or between
/// concurrent dispatches. Handlers read fields written by earlier handlers
/// and points, and write their own under agreed names.
///
/// `error` is written by [`HookRegistry::run`](crate::HookRegistry::run)
/// when a handler fails. The Operation decides after each point whether to
/// propagate it or discard it.
#[derive(Debug, Clone)]
pub struct HookContext {
    intent: Intent,

    /// Failure captured by the last `run` that saw one.
    pub error: Option<HookError>,

    fields: HashMap<String, Value>,
}

impl HookContext {
    /// Creates a context for one Operation execution.
    #[must_use]
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            error: None,
            fields: HashMap::new(),
        }
    }

    /// The intent being executed. Read-only.
    #[must_use]
    pub fn intent(&self) -> &Intent {
        &self.intent
    }

    /// Writes a field, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] if `value` cannot be encoded as JSON.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), HandlerError> {
        self.fields.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Writes a raw JSON field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Reads a field as `T`. `Ok(None)` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] if the stored value does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, HandlerError> {
        self.fields
            .get(key)
            .map(|v| T::deserialize(v).map_err(HandlerError::from))
            .transpose()
    }

    /// Raw field access.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if the field was written.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Removes and decodes a field.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] if the stored value does not decode as `T`.
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, HandlerError> {
        self.fields
            .remove(key)
            .map(|v| serde_json::from_value(v).map_err(HandlerError::from))
            .transpose()
    }

    /// Removes and returns the captured error.
    ///
    /// Best-effort points call this after `run` to inspect and discard a
    /// failure before the next point.
    pub fn take_error(&mut self) -> Option<HookError> {
        self.error.take()
    }

    /// Returns `Err` with the captured error, leaving the context clean.
    ///
    /// Mandatory points call this after `run`.
    ///
    /// # Errors
    ///
    /// Returns the error captured by the last failing handler.
    pub fn check(&mut self) -> Result<(), HookError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Names of all written fields, sorted.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn ctx() -> HookContext {
        HookContext::new(Intent::new("project:open", json!({"kind": "local"})))
    }

    #[test]
    fn new_context_is_empty() {
        let ctx = ctx();
        assert!(ctx.error.is_none());
        assert!(ctx.field_names().is_empty());
        assert_eq!(ctx.intent().intent_type(), "project:open");
    }

    #[test]
    fn typed_set_and_get() {
        let mut ctx = ctx();
        ctx.set("projectPath", &PathBuf::from("/repo"))
            .expect("path should encode");

        let path: Option<PathBuf> = ctx.get("projectPath").expect("path should decode");
        assert_eq!(path, Some(PathBuf::from("/repo")));
        assert!(ctx.has("projectPath"));
        assert!(ctx.get::<PathBuf>("missing").expect("absent is ok").is_none());
    }

    #[test]
    fn get_with_wrong_type_is_error() {
        let mut ctx = ctx();
        ctx.insert("count", json!("three"));
        assert!(ctx.get::<u32>("count").is_err());
    }

    #[test]
    fn take_removes_field() {
        let mut ctx = ctx();
        ctx.insert("url", json!("https://example.com/repo.git"));
        let url: Option<String> = ctx.take("url").expect("string should decode");
        assert_eq!(url.as_deref(), Some("https://example.com/repo.git"));
        assert!(!ctx.has("url"));
    }

    #[test]
    fn check_clears_error() {
        let mut ctx = ctx();
        ctx.error = Some(HookError::InvalidResult {
            operation: "o".into(),
            point: "p".into(),
            handler: "h".into(),
            message: "bad".into(),
        });

        assert!(ctx.check().is_err());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn field_names_sorted() {
        let mut ctx = ctx();
        ctx.insert("b", json!(1));
        ctx.insert("a", json!(2));
        assert_eq!(ctx.field_names(), vec!["a", "b"]);
    }
}
