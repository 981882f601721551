//! Test harness: an explicitly constructed registry/dispatcher pair with
//! an event recorder.
//!
//! ```
//! use hydra_runtime::testing::TestHarness;
//! use hydra_types::DomainEvent;
//! use serde_json::json;
//!
//! let harness = TestHarness::new();
//! harness.record("workspace:created");
//! harness.dispatcher.emit(&DomainEvent::new("workspace:created", json!({})));
//! assert_eq!(harness.events.count("workspace:created"), 1);
//! ```

use crate::eventbus::EventHandler;
use crate::module::{wire_modules, IntentModule, WiringReport};
use crate::Dispatcher;
use hydra_hook::{HandlerError, HookRegistry};
use hydra_types::{DomainEvent, EventKind};
use parking_lot::Mutex;
use std::sync::Arc;

pub use crate::interceptor::testing::MockInterceptor;
pub use hydra_hook::testing::MockHandler;

/// Records every event it is subscribed to, in delivery order.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded event.
    #[must_use]
    pub fn all(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    /// Recorded events of `event_type`.
    #[must_use]
    pub fn of_type(&self, event_type: &str) -> Vec<DomainEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    /// Decoded payloads of every recorded `K` event.
    ///
    /// # Panics
    ///
    /// Panics if a recorded payload does not decode as `K::Payload`.
    #[must_use]
    pub fn payloads<K: EventKind>(&self) -> Vec<K::Payload> {
        self.of_type(K::TYPE)
            .iter()
            .map(|e| e.decode::<K>().expect("recorded payload decodes"))
            .collect()
    }

    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventHandler for EventRecorder {
    fn on_event(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// A fresh engine per test. Nothing is shared between harnesses.
pub struct TestHarness {
    pub hooks: Arc<HookRegistry>,
    pub dispatcher: Dispatcher,
    pub events: EventRecorder,
}

impl TestHarness {
    #[must_use]
    pub fn new() -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let dispatcher = Dispatcher::new(Arc::clone(&hooks));
        Self {
            hooks,
            dispatcher,
            events: EventRecorder::new(),
        }
    }

    /// Sets the dispatch depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.dispatcher = self.dispatcher.with_max_depth(max_depth);
        self
    }

    /// Subscribes the recorder to `event_type`.
    pub fn record(&self, event_type: &str) {
        self.dispatcher
            .subscribe(event_type, Arc::new(self.events.clone()));
    }

    /// Subscribes the recorder to each of `event_types`.
    pub fn record_all(&self, event_types: &[&str]) {
        for event_type in event_types {
            self.record(event_type);
        }
    }

    /// Wires `modules` into this harness.
    pub fn wire(&self, modules: impl IntoIterator<Item = IntentModule>) -> WiringReport {
        wire_modules(modules, &self.hooks, &self.dispatcher)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
