//! Intent dispatcher.
//!
//! # Flow
//!
//! ```text
//! dispatch(intent)
//!   │
//!   ├─► depth > max?              ─► Err(DepthExceeded)
//!   ├─► interceptor 1..N before   ─► None ─► after(Cancelled) ─► Ok(None)
//!   ├─► lookup operation          ─► missing ─► Err(UnknownIntent)
//!   ├─► operation.execute(ctx)    ─► ctx.dispatch recurses at depth + 1
//!   └─► after(Completed | Failed) on every interceptor that passed
//! ```
//!
//! The Dispatcher is constructed explicitly and passed by reference to
//! whatever dispatches. There is no global instance.

use crate::eventbus::{EventBus, EventHandler, Subscription};
use crate::interceptor::{DispatchOutcome, Interceptor, InterceptorChain};
use crate::operation::{Operation, OperationContext};
use crate::DispatchError;
use hydra_hook::HookRegistry;
use hydra_types::{DomainEvent, Intent, IntentKind};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

/// Default limit for nested sub-dispatch.
pub const DEFAULT_MAX_DEPTH: usize = 8;

type DispatchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Value>, DispatchError>> + Send + 'a>>;

/// Routes intents to Operations through the interceptor chain.
pub struct Dispatcher {
    hooks: Arc<HookRegistry>,
    operations: RwLock<HashMap<String, Arc<dyn Operation>>>,
    interceptors: RwLock<InterceptorChain>,
    events: EventBus,
    max_depth: usize,
}

impl Dispatcher {
    /// Creates a dispatcher whose Operations run hooks from `hooks`.
    #[must_use]
    pub fn new(hooks: Arc<HookRegistry>) -> Self {
        Self {
            hooks,
            operations: RwLock::new(HashMap::new()),
            interceptors: RwLock::new(InterceptorChain::new()),
            events: EventBus::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the sub-dispatch depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The hook registry Operations are bound to.
    #[must_use]
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // ── Registration ─────────────────────────────────────────

    /// Registers `operation` for `intent_type`.
    ///
    /// Last registration wins. The replaced Operation, if any, is
    /// returned and a warning is logged.
    pub fn register_operation(
        &self,
        intent_type: impl Into<String>,
        operation: Arc<dyn Operation>,
    ) -> Option<Arc<dyn Operation>> {
        let intent_type = intent_type.into();
        let previous = self
            .operations
            .write()
            .insert(intent_type.clone(), operation);
        if let Some(old) = &previous {
            tracing::warn!(
                intent = %intent_type,
                replaced = old.id(),
                "operation re-registered, previous registration replaced"
            );
        } else {
            tracing::debug!(intent = %intent_type, "operation registered");
        }
        previous
    }

    /// Inserts an interceptor by order, ties after existing entries.
    pub fn add_interceptor(&self, interceptor: Arc<dyn Interceptor>) {
        tracing::debug!(
            interceptor = interceptor.id(),
            order = interceptor.order(),
            "interceptor added"
        );
        self.interceptors.write().insert(interceptor);
    }

    /// Appends a subscriber for `event_type`.
    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Subscription {
        self.events.subscribe(event_type, handler)
    }

    /// Delivers `event` to its subscribers. Returns the failure count.
    pub fn emit(&self, event: &DomainEvent) -> usize {
        self.events.emit(event)
    }

    // ── Introspection ────────────────────────────────────────

    /// Intent types with a registered Operation, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.operations.read().keys().cloned().collect();
        types.sort_unstable();
        types
    }

    #[must_use]
    pub fn has_operation(&self, intent_type: &str) -> bool {
        self.operations.read().contains_key(intent_type)
    }

    /// Interceptor IDs in execution order.
    #[must_use]
    pub fn interceptor_ids(&self) -> Vec<String> {
        self.interceptors.read().ids()
    }

    #[must_use]
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.events.subscriber_count(event_type)
    }

    // ── Dispatch ─────────────────────────────────────────────

    /// Dispatches a top-level intent.
    ///
    /// Returns `Ok(None)` when an interceptor cancelled the intent.
    ///
    /// # Errors
    ///
    /// Returns a routing error for an unregistered type, or whatever the
    /// Operation failed with.
    pub async fn dispatch(&self, intent: Intent) -> Result<Option<Value>, DispatchError> {
        self.dispatch_at(intent, 0).await
    }

    /// Typed form of [`dispatch`](Self::dispatch).
    ///
    /// # Errors
    ///
    /// As [`dispatch`](Self::dispatch), plus payload/result shape
    /// mismatches against `K`.
    pub async fn dispatch_as<K: IntentKind>(
        &self,
        payload: &K::Payload,
    ) -> Result<Option<K::Output>, DispatchError> {
        let intent = Intent::of::<K>(payload).map_err(|e| DispatchError::InvalidPayload {
            intent: K::TYPE.to_string(),
            message: e.to_string(),
        })?;
        let value = self.dispatch(intent).await?;
        decode_output::<K>(value)
    }

    pub(crate) fn dispatch_at(&self, intent: Intent, depth: usize) -> DispatchFuture<'_> {
        let span = tracing::debug_span!(
            "dispatch",
            intent = %intent.intent_type(),
            depth,
            id = %uuid::Uuid::new_v4(),
        );
        Box::pin(self.dispatch_inner(intent, depth).instrument(span))
    }

    async fn dispatch_inner(
        &self,
        intent: Intent,
        depth: usize,
    ) -> Result<Option<Value>, DispatchError> {
        if depth > self.max_depth {
            tracing::warn!(max_depth = self.max_depth, "dispatch depth exceeded");
            return Err(DispatchError::DepthExceeded {
                intent: intent.intent_type().to_string(),
                depth,
                max_depth: self.max_depth,
            });
        }

        let chain = self.interceptors.read().snapshot();
        let mut passed: Vec<(Arc<dyn Interceptor>, Intent)> = Vec::with_capacity(chain.len());
        let mut current = intent;

        for interceptor in chain {
            let seen = current.clone();
            match interceptor.before(current).await {
                Some(next) => {
                    passed.push((interceptor, seen));
                    current = next;
                }
                None => {
                    tracing::debug!(
                        interceptor = interceptor.id(),
                        intent = %seen.intent_type(),
                        "intent cancelled by interceptor"
                    );
                    settle(&passed, DispatchOutcome::Cancelled).await;
                    return Ok(None);
                }
            }
        }

        let operation = self.operations.read().get(current.intent_type()).cloned();
        let Some(operation) = operation else {
            let err = DispatchError::UnknownIntent(current.intent_type().to_string());
            settle(&passed, DispatchOutcome::Failed(&err)).await;
            return Err(err);
        };

        let hooks = self.hooks.bind(operation.id());
        let ctx = OperationContext::new(current, hooks, self, depth);
        let result = operation.execute(ctx).await;

        match &result {
            Ok(value) => settle(&passed, DispatchOutcome::Completed(value)).await,
            Err(err) => {
                tracing::debug!(error = %err, "operation failed");
                settle(&passed, DispatchOutcome::Failed(err)).await;
            }
        }

        result.map(Some)
    }
}

/// Calls `after` on every interceptor that let the intent through, last
/// one first.
async fn settle(passed: &[(Arc<dyn Interceptor>, Intent)], outcome: DispatchOutcome<'_>) {
    for (interceptor, seen) in passed.iter().rev() {
        interceptor.after(seen, outcome).await;
    }
}

pub(crate) fn decode_output<K: IntentKind>(
    value: Option<Value>,
) -> Result<Option<K::Output>, DispatchError> {
    value
        .map(serde_json::from_value::<K::Output>)
        .transpose()
        .map_err(|e| DispatchError::InvalidOutput {
            intent: K::TYPE.to_string(),
            message: e.to_string(),
        })
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("operations", &self.registered_types())
            .field("interceptors", &self.interceptor_ids())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::testing::MockInterceptor;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Operation for Echo {
        fn id(&self) -> &str {
            "echo"
        }

        async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
            Ok(ctx.intent().payload().clone())
        }
    }

    /// Dispatches its own type until `remaining` reaches zero.
    struct Recurse;

    #[async_trait]
    impl Operation for Recurse {
        fn id(&self) -> &str {
            "recurse"
        }

        async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
            let remaining = ctx.intent().payload()["remaining"].as_u64().unwrap_or(0);
            if remaining == 0 {
                return Ok(json!({"depth": ctx.depth()}));
            }
            let next = Intent::new("recurse", json!({"remaining": remaining - 1}));
            Ok(ctx.dispatch(next).await?.unwrap_or(Value::Null))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(HookRegistry::new()))
    }

    #[tokio::test]
    async fn routes_to_registered_operation() {
        let d = dispatcher();
        d.register_operation("echo", Arc::new(Echo));

        let out = d
            .dispatch(Intent::new("echo", json!({"a": 1})))
            .await
            .expect("dispatch");
        assert_eq!(out, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn unknown_intent_is_routing_error() {
        let d = dispatcher();
        let err = d
            .dispatch(Intent::new("nope", Value::Null))
            .await
            .expect_err("unknown type");
        assert_eq!(err, DispatchError::UnknownIntent("nope".into()));
    }

    #[tokio::test]
    async fn reregistration_returns_previous() {
        let d = dispatcher();
        assert!(d.register_operation("echo", Arc::new(Echo)).is_none());
        let old = d.register_operation("echo", Arc::new(Echo));
        assert_eq!(old.map(|o| o.id().to_string()), Some("echo".into()));
        assert_eq!(d.registered_types(), vec!["echo"]);
    }

    #[tokio::test]
    async fn interceptor_rewrite_reroutes() {
        let d = dispatcher();
        d.register_operation("echo", Arc::new(Echo));
        d.add_interceptor(Arc::new(MockInterceptor::rewriting("alias", |intent| {
            if intent.intent_type() == "say" {
                Some(Intent::new("echo", intent.payload().clone()))
            } else {
                Some(intent)
            }
        })));

        let out = d
            .dispatch(Intent::new("say", json!("hi")))
            .await
            .expect("dispatch");
        assert_eq!(out, Some(json!("hi")));
    }

    #[tokio::test]
    async fn cancellation_settles_earlier_interceptors() {
        let d = dispatcher();
        d.register_operation("echo", Arc::new(Echo));
        let first = Arc::new(MockInterceptor::pass_through("first").with_order(10));
        let stop = Arc::new(MockInterceptor::cancelling("stop").with_order(20));
        let never = Arc::new(MockInterceptor::pass_through("never").with_order(30));
        d.add_interceptor(first.clone());
        d.add_interceptor(stop.clone());
        d.add_interceptor(never.clone());

        let out = d
            .dispatch(Intent::new("echo", Value::Null))
            .await
            .expect("cancel is not an error");

        assert!(out.is_none());
        assert_eq!(*first.settled.lock(), vec!["cancelled"]);
        assert!(stop.settled.lock().is_empty());
        assert_eq!(never.calls(), 0);
    }

    #[tokio::test]
    async fn after_sees_failure_of_routing() {
        let d = dispatcher();
        let watcher = Arc::new(MockInterceptor::pass_through("watch"));
        d.add_interceptor(watcher.clone());

        let _ = d.dispatch(Intent::new("missing", Value::Null)).await;
        assert_eq!(*watcher.settled.lock(), vec!["failed"]);
    }

    #[tokio::test]
    async fn nested_dispatch_tracks_depth() {
        let d = dispatcher();
        d.register_operation("recurse", Arc::new(Recurse));

        let out = d
            .dispatch(Intent::new("recurse", json!({"remaining": 3})))
            .await
            .expect("within limit");
        assert_eq!(out, Some(json!({"depth": 3})));
    }

    #[tokio::test]
    async fn runaway_recursion_is_stopped() {
        let d = dispatcher().with_max_depth(4);
        d.register_operation("recurse", Arc::new(Recurse));

        let err = d
            .dispatch(Intent::new("recurse", json!({"remaining": 100})))
            .await
            .expect_err("depth guard");
        assert_eq!(
            err,
            DispatchError::DepthExceeded {
                intent: "recurse".into(),
                depth: 5,
                max_depth: 4,
            }
        );
    }

    #[derive(Serialize, Deserialize)]
    struct Ping {
        n: u32,
    }

    struct PingKind;

    impl IntentKind for PingKind {
        const TYPE: &'static str = "echo";
        type Payload = Ping;
        type Output = Ping;
    }

    #[tokio::test]
    async fn dispatch_as_decodes_output() {
        let d = dispatcher();
        d.register_operation("echo", Arc::new(Echo));

        let out = d
            .dispatch_as::<PingKind>(&Ping { n: 7 })
            .await
            .expect("dispatch")
            .expect("not cancelled");
        assert_eq!(out.n, 7);
    }
}
