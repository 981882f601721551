//! In-progress guard for intents that must not run twice at once.
//!
//! ```text
//! before(intent) ─► key ∈ in_progress or already done? ─► cancel
//!                └► insert key ─► pass
//!
//! completion event ─► remove key
//! after(any outcome) ─► remove key
//! ```
//!
//! `after` runs once the Operation settles, whatever the outcome, so an
//! Operation that errors does not block the same key until restart. The
//! completion event covers keys whose intent was rewritten downstream.

use crate::eventbus::EventHandler;
use crate::interceptor::{DispatchOutcome, Interceptor};
use crate::module::IntentModule;
use async_trait::async_trait;
use hydra_hook::HandlerError;
use hydra_types::{DomainEvent, Intent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

type IntentKeyFn = Arc<dyn Fn(&Intent) -> Option<String> + Send + Sync>;
type EventKeyFn = Arc<dyn Fn(&DomainEvent) -> Option<String> + Send + Sync>;
type DoneFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Order the guard interceptor runs at, ahead of default-order ones.
pub const GUARD_ORDER: i32 = 10;

/// Shared in-progress key set plus the rules that fill and drain it.
#[derive(Clone)]
pub struct IdempotencyGuard {
    id: String,
    intent_type: String,
    intent_key: IntentKeyFn,
    already_done: Option<DoneFn>,
    release_event: Option<(String, EventKeyFn)>,
    in_progress: Arc<Mutex<HashSet<String>>>,
}

impl IdempotencyGuard {
    /// Starts a guard for intents of `intent_type`, keyed by `key`.
    ///
    /// Intents for which `key` returns `None` pass unguarded.
    pub fn builder<F>(
        id: impl Into<String>,
        intent_type: impl Into<String>,
        key: F,
    ) -> IdempotencyGuardBuilder
    where
        F: Fn(&Intent) -> Option<String> + Send + Sync + 'static,
    {
        IdempotencyGuardBuilder {
            guard: Self {
                id: id.into(),
                intent_type: intent_type.into(),
                intent_key: Arc::new(key),
                already_done: None,
                release_event: None,
                in_progress: Arc::new(Mutex::new(HashSet::new())),
            },
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` if `key` is currently held.
    #[must_use]
    pub fn is_in_progress(&self, key: &str) -> bool {
        self.in_progress.lock().contains(key)
    }

    /// Held keys, sorted.
    #[must_use]
    pub fn in_progress(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.in_progress.lock().iter().cloned().collect();
        keys.sort_unstable();
        keys
    }

    fn release(&self, key: &str, reason: &str) {
        if self.in_progress.lock().remove(key) {
            tracing::debug!(guard = %self.id, key, reason, "idempotency key released");
        }
    }

    /// Packages the interceptor and the release subscriber as a module.
    #[must_use]
    pub fn module(&self) -> IntentModule {
        let mut module = IntentModule::new(self.id.clone()).interceptor(Arc::new(self.clone()));
        if let Some((event_type, _)) = &self.release_event {
            module = module.on_event(event_type.clone(), Arc::new(self.clone()));
        }
        module
    }
}

impl std::fmt::Debug for IdempotencyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyGuard")
            .field("id", &self.id)
            .field("intent_type", &self.intent_type)
            .field("in_progress", &self.in_progress())
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`IdempotencyGuard::builder`].
pub struct IdempotencyGuardBuilder {
    guard: IdempotencyGuard,
}

impl IdempotencyGuardBuilder {
    /// Cancels intents whose key the target state already reflects.
    #[must_use]
    pub fn already_done<F>(mut self, done: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.guard.already_done = Some(Arc::new(done));
        self
    }

    /// Releases the key carried by each `event_type` event.
    #[must_use]
    pub fn released_by<F>(mut self, event_type: impl Into<String>, key: F) -> Self
    where
        F: Fn(&DomainEvent) -> Option<String> + Send + Sync + 'static,
    {
        self.guard.release_event = Some((event_type.into(), Arc::new(key)));
        self
    }

    #[must_use]
    pub fn build(self) -> IdempotencyGuard {
        self.guard
    }
}

#[async_trait]
impl Interceptor for IdempotencyGuard {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i32 {
        GUARD_ORDER
    }

    async fn before(&self, intent: Intent) -> Option<Intent> {
        if intent.intent_type() != self.intent_type {
            return Some(intent);
        }
        let Some(key) = (self.intent_key)(&intent) else {
            return Some(intent);
        };

        if let Some(done) = &self.already_done {
            if done(&key) {
                tracing::debug!(guard = %self.id, key = %key, "already done, cancelling");
                return None;
            }
        }

        if !self.in_progress.lock().insert(key.clone()) {
            tracing::debug!(guard = %self.id, key = %key, "already in progress, cancelling");
            return None;
        }
        Some(intent)
    }

    async fn after(&self, intent: &Intent, outcome: DispatchOutcome<'_>) {
        if intent.intent_type() != self.intent_type {
            return;
        }
        let reason = match outcome {
            DispatchOutcome::Completed(_) => "settled",
            DispatchOutcome::Failed(_) => "failed",
            DispatchOutcome::Cancelled => "cancelled",
        };
        if let Some(key) = (self.intent_key)(intent) {
            self.release(&key, reason);
        }
    }
}

impl EventHandler for IdempotencyGuard {
    fn on_event(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        if let Some((event_type, key_fn)) = &self.release_event {
            if event.event_type() == event_type {
                if let Some(key) = key_fn(event) {
                    self.release(&key, "completed");
                }
            }
        }
        Ok(())
    }
}
