//! Domain event subscriber table.
//!
//! Events are fire-and-observe: [`EventBus::emit`] calls every subscriber
//! of the event type in subscription order, and a failing subscriber is
//! logged and skipped. Nothing a subscriber does can change the outcome
//! of the Operation that emitted the event.

use hydra_hook::HandlerError;
use hydra_types::DomainEvent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An event subscriber.
///
/// Subscribers run synchronously inside `emit`. Long work belongs on a
/// channel owned by the subscriber, not in this call.
///
/// Any `Fn(&DomainEvent) -> Result<(), HandlerError>` closure is a
/// subscriber.
pub trait EventHandler: Send + Sync {
    /// Observes one event.
    ///
    /// # Errors
    ///
    /// A returned error is logged by the bus and otherwise ignored.
    fn on_event(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&DomainEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn on_event(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

struct Subscriber {
    id: u64,
    handler: Arc<dyn EventHandler>,
}

#[derive(Default)]
struct Table {
    next_id: AtomicU64,
    subscribers: RwLock<HashMap<String, Vec<Subscriber>>>,
}

/// Subscriber lists keyed by event type.
#[derive(Clone, Default)]
pub struct EventBus {
    table: Arc<Table>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber for `event_type`.
    ///
    /// Dropping the returned [`Subscription`] does not unsubscribe; call
    /// [`Subscription::unsubscribe`].
    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Subscription {
        let event_type = event_type.into();
        let id = self.table.next_id.fetch_add(1, Ordering::Relaxed);
        self.table
            .subscribers
            .write()
            .entry(event_type.clone())
            .or_default()
            .push(Subscriber { id, handler });

        Subscription {
            table: Arc::downgrade(&self.table),
            event_type,
            id,
        }
    }

    /// Number of subscribers for `event_type`.
    #[must_use]
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.table
            .subscribers
            .read()
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Delivers `event` to every subscriber of its type, in order.
    ///
    /// Returns the number of subscribers that failed.
    pub fn emit(&self, event: &DomainEvent) -> usize {
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .table
            .subscribers
            .read()
            .get(event.event_type())
            .map(|subs| subs.iter().map(|s| Arc::clone(&s.handler)).collect())
            .unwrap_or_default();

        tracing::debug!(
            event = event.event_type(),
            subscribers = handlers.len(),
            "emit"
        );

        let mut failures = 0;
        for handler in handlers {
            if let Err(e) = handler.on_event(event) {
                failures += 1;
                tracing::warn!(
                    event = event.event_type(),
                    error = %e,
                    "event subscriber failed"
                );
            }
        }
        failures
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    table: std::sync::Weak<Table>,
    event_type: String,
    id: u64,
}

impl Subscription {
    /// The event type this subscription listens to.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Removes the subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(table) = self.table.upgrade() else {
            return false;
        };
        let mut subscribers = table.subscribers.write();
        let Some(list) = subscribers.get_mut(&self.event_type) else {
            return false;
        };
        let before = list.len();
        list.retain(|s| s.id != self.id);
        list.len() < before
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Arc<dyn EventHandler> {
        let log = Arc::clone(log);
        Arc::new(move |event: &DomainEvent| -> Result<(), HandlerError> {
            log.lock().push(format!("{tag}:{}", event.event_type()));
            Ok(())
        })
    }

    #[test]
    fn emit_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("project:opened", recorder(&log, "a"));
        bus.subscribe("project:opened", recorder(&log, "b"));

        bus.emit(&DomainEvent::new("project:opened", json!({})));

        assert_eq!(*log.lock(), vec!["a:project:opened", "b:project:opened"]);
    }

    #[test]
    fn emit_only_reaches_matching_type() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("project:closed", recorder(&log, "a"));

        bus.emit(&DomainEvent::new("project:opened", json!({})));

        assert!(log.lock().is_empty());
    }

    #[test]
    fn failing_subscriber_does_not_stop_others() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(
            "ui:mode-changed",
            Arc::new(|_: &DomainEvent| -> Result<(), HandlerError> {
                Err(HandlerError::new("bridge down"))
            }),
        );
        bus.subscribe("ui:mode-changed", recorder(&log, "after"));

        let failures = bus.emit(&DomainEvent::new("ui:mode-changed", json!({})));

        assert_eq!(failures, 1);
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn unsubscribe_removes_only_that_subscriber() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = bus.subscribe("workspace:created", recorder(&log, "a"));
        bus.subscribe("workspace:created", recorder(&log, "b"));

        assert!(first.unsubscribe());
        assert_eq!(bus.subscriber_count("workspace:created"), 1);

        bus.emit(&DomainEvent::new("workspace:created", json!({})));
        assert_eq!(*log.lock(), vec!["b:workspace:created"]);
    }

    #[test]
    fn unsubscribe_after_bus_dropped() {
        let bus = EventBus::new();
        let sub = bus.subscribe(
            "x",
            Arc::new(|_: &DomainEvent| -> Result<(), HandlerError> { Ok(()) }),
        );
        drop(bus);
        assert!(!sub.unsubscribe());
    }
}
