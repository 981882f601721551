//! Plugin modules and the startup wiring pass.
//!
//! A module is a bundle of contributions: hook handlers keyed by
//! `(operation, point)`, event subscribers keyed by event type, and
//! interceptors. [`wire_modules`] registers them in one pass, and the
//! order of the module list is the order handlers run within a point.

use crate::eventbus::{EventHandler, Subscription};
use crate::interceptor::Interceptor;
use crate::Dispatcher;
use hydra_hook::{HookHandler, HookRegistry};
use std::sync::Arc;

struct HookEntry {
    operation: String,
    point: String,
    handler: Arc<dyn HookHandler>,
}

/// A named set of hook handlers, event subscribers and interceptors.
///
/// Within one module, a `(operation, point)` pair or an event type holds
/// at most one entry: contributing the same key again replaces the
/// earlier handler in place.
pub struct IntentModule {
    name: String,
    hooks: Vec<HookEntry>,
    events: Vec<(String, Arc<dyn EventHandler>)>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl IntentModule {
    /// Creates an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: Vec::new(),
            events: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contributes `handler` to `(operation, point)`.
    #[must_use]
    pub fn hook(
        mut self,
        operation: impl Into<String>,
        point: impl Into<String>,
        handler: Arc<dyn HookHandler>,
    ) -> Self {
        let operation = operation.into();
        let point = point.into();
        match self
            .hooks
            .iter_mut()
            .find(|e| e.operation == operation && e.point == point)
        {
            Some(entry) => entry.handler = handler,
            None => self.hooks.push(HookEntry {
                operation,
                point,
                handler,
            }),
        }
        self
    }

    /// Subscribes `handler` to `event_type`.
    #[must_use]
    pub fn on_event(
        mut self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        let event_type = event_type.into();
        match self.events.iter_mut().find(|(t, _)| *t == event_type) {
            Some(entry) => entry.1 = handler,
            None => self.events.push((event_type, handler)),
        }
        self
    }

    /// Adds an interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// `(operation, point)` pairs this module contributes to, in order.
    #[must_use]
    pub fn hook_points(&self) -> Vec<(&str, &str)> {
        self.hooks
            .iter()
            .map(|e| (e.operation.as_str(), e.point.as_str()))
            .collect()
    }

    /// Event types this module subscribes to, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&str> {
        self.events.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl std::fmt::Debug for IntentModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentModule")
            .field("name", &self.name)
            .field("hooks", &self.hook_points())
            .field("events", &self.event_types())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// What [`wire_modules`] registered.
#[derive(Debug, Default)]
pub struct WiringReport {
    /// Module names in wiring order.
    pub modules: Vec<String>,
    /// Hook handlers registered.
    pub hooks: usize,
    /// Interceptors added.
    pub interceptors: usize,
    /// One handle per event subscription, for callers that tear down.
    pub subscriptions: Vec<Subscription>,
}

/// Registers every contribution of `modules`, in order.
///
/// Run once at startup. Calling it twice with the same modules registers
/// every hook handler twice.
pub fn wire_modules(
    modules: impl IntoIterator<Item = IntentModule>,
    hooks: &HookRegistry,
    dispatcher: &Dispatcher,
) -> WiringReport {
    let mut report = WiringReport::default();

    for module in modules {
        for entry in module.hooks {
            hooks.register(&entry.operation, &entry.point, entry.handler);
            report.hooks += 1;
        }
        for (event_type, handler) in module.events {
            report
                .subscriptions
                .push(dispatcher.subscribe(event_type, handler));
        }
        for interceptor in module.interceptors {
            dispatcher.add_interceptor(interceptor);
            report.interceptors += 1;
        }
        report.modules.push(module.name);
    }

    tracing::info!(
        modules = report.modules.len(),
        hooks = report.hooks,
        subscriptions = report.subscriptions.len(),
        interceptors = report.interceptors,
        "modules wired"
    );
    report
}
