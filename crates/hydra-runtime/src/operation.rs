//! Operation contract and the context an Operation runs with.
//!
//! An Operation is a fixed script:
//!
//! ```text
//! CREATED ─► point 1 ─► point 2 ─► … ─► (sub-dispatch fan-out)
//!               │          │
//!               ▼          ▼                 ─► RESULT ─► EMIT ─► DONE
//!            ERRORED    ERRORED   (mandatory points only)
//! ```
//!
//! The helpers on [`OperationContext`] encode the recurring shapes:
//! mandatory points propagate their error, best-effort points log and
//! discard it, and fan-out keeps going when a sub-dispatch fails.

use crate::{DispatchError, Dispatcher};
use async_trait::async_trait;
use hydra_hook::{BoundHooks, HookContext, HookError, MergeResult};
use hydra_types::{DomainEvent, EventKind, Intent, IntentKind};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One Operation per intent type.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Operation ID. Hook handlers are registered under this ID.
    fn id(&self) -> &str;

    /// Runs the script and returns the result value.
    ///
    /// # Errors
    ///
    /// Returns the error of a mandatory hook point, or a rejection when
    /// required fields were not produced.
    async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError>;
}

/// What an Operation sees while it executes.
pub struct OperationContext<'a> {
    intent: Intent,
    hooks: BoundHooks,
    dispatcher: &'a Dispatcher,
    depth: usize,
}

impl<'a> OperationContext<'a> {
    pub(crate) fn new(
        intent: Intent,
        hooks: BoundHooks,
        dispatcher: &'a Dispatcher,
        depth: usize,
    ) -> Self {
        Self {
            intent,
            hooks,
            dispatcher,
            depth,
        }
    }

    /// The intent being executed, after interceptors.
    #[must_use]
    pub fn intent(&self) -> &Intent {
        &self.intent
    }

    /// Decodes the payload.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidPayload`] on a shape mismatch.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, DispatchError> {
        self.intent
            .payload_as()
            .map_err(|e| DispatchError::InvalidPayload {
                intent: self.intent.intent_type().to_string(),
                message: e.to_string(),
            })
    }

    /// Registry view bound to this Operation.
    #[must_use]
    pub fn hooks(&self) -> &BoundHooks {
        &self.hooks
    }

    /// A fresh hook context for this execution.
    #[must_use]
    pub fn hook_context(&self) -> HookContext {
        HookContext::new(self.intent.clone())
    }

    /// Nesting depth of this execution (0 for a top-level dispatch).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    // ── Hook point policies ──────────────────────────────────

    /// Runs a mandatory point: any captured error aborts the Operation.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure at `point`.
    pub async fn run_mandatory(
        &self,
        point: &str,
        hook_ctx: &mut HookContext,
    ) -> Result<(), DispatchError> {
        self.hooks.run(point, hook_ctx).await;
        hook_ctx.check().map_err(DispatchError::from)
    }

    /// Runs a best-effort point: a captured error is logged, cleared and
    /// returned for inspection. Execution continues either way.
    pub async fn run_best_effort(
        &self,
        point: &str,
        hook_ctx: &mut HookContext,
    ) -> Option<HookError> {
        self.hooks.run(point, hook_ctx).await;
        let err = hook_ctx.take_error();
        if let Some(e) = &err {
            tracing::warn!(
                operation = self.hooks.operation(),
                point,
                error = %e,
                "best-effort hook point failed, continuing"
            );
        }
        err
    }

    /// Collects a mandatory point and merges the contributions.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure, in registration order.
    pub async fn collect_mandatory<T>(
        &self,
        point: &str,
        hook_ctx: &mut HookContext,
    ) -> Result<T, DispatchError>
    where
        T: MergeResult + DeserializeOwned + Send,
    {
        let outcome = self.hooks.collect::<T>(point, hook_ctx).await;
        outcome.merged().map_err(DispatchError::from)
    }

    /// Collects a best-effort point: failures are logged and dropped.
    pub async fn collect_best_effort<T>(&self, point: &str, hook_ctx: &mut HookContext) -> T
    where
        T: MergeResult + DeserializeOwned + Send,
    {
        let outcome = self.hooks.collect::<T>(point, hook_ctx).await;
        let (merged, errors) = outcome.merged_lenient();
        for e in &errors {
            tracing::warn!(
                operation = self.hooks.operation(),
                point,
                error = %e,
                "best-effort collect handler failed"
            );
        }
        merged
    }

    // ── Sub-dispatch ─────────────────────────────────────────

    /// Dispatches a sub-intent through the same Dispatcher and waits for
    /// it to complete.
    ///
    /// # Errors
    ///
    /// Propagates the sub-dispatch error unchanged.
    pub async fn dispatch(&self, intent: Intent) -> Result<Option<Value>, DispatchError> {
        self.dispatcher.dispatch_at(intent, self.depth + 1).await
    }

    /// Typed form of [`dispatch`](Self::dispatch).
    ///
    /// # Errors
    ///
    /// Propagates the sub-dispatch error, or reports a payload/result
    /// that does not match `K`.
    pub async fn dispatch_as<K: IntentKind>(
        &self,
        payload: &K::Payload,
    ) -> Result<Option<K::Output>, DispatchError> {
        let intent = Intent::of::<K>(payload).map_err(|e| DispatchError::InvalidPayload {
            intent: K::TYPE.to_string(),
            message: e.to_string(),
        })?;
        let value = self.dispatch(intent).await?;
        crate::dispatcher::decode_output::<K>(value)
    }

    /// Dispatches each intent in order, awaiting each before the next,
    /// and keeps going when one fails.
    ///
    /// Failures are logged and reported, never propagated.
    pub async fn fan_out<I>(&self, intents: I) -> FanOutReport
    where
        I: IntoIterator<Item = Intent> + Send,
        I::IntoIter: Send,
    {
        let mut report = FanOutReport::default();
        for (index, intent) in intents.into_iter().enumerate() {
            report.attempted += 1;
            let intent_type = intent.intent_type().to_string();
            match self.dispatch(intent).await {
                Ok(Some(_)) => report.succeeded += 1,
                Ok(None) => report.cancelled += 1,
                Err(e) => {
                    tracing::warn!(
                        parent = self.hooks.operation(),
                        intent = %intent_type,
                        index,
                        error = %e,
                        "sub-dispatch failed, continuing with next item"
                    );
                    report.failures.push((index, e));
                }
            }
        }
        report
    }

    // ── Events ───────────────────────────────────────────────

    /// Delivers an event to subscribers. Subscriber failures never reach
    /// the Operation.
    pub fn emit(&self, event: DomainEvent) {
        self.dispatcher.emit(&event);
    }

    /// Typed form of [`emit`](Self::emit).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidOutput`] if the payload cannot be
    /// encoded.
    pub fn emit_as<K: EventKind>(&self, payload: &K::Payload) -> Result<(), DispatchError> {
        let event = DomainEvent::of::<K>(payload).map_err(|e| DispatchError::InvalidOutput {
            intent: self.intent.intent_type().to_string(),
            message: format!("cannot encode {} event: {e}", K::TYPE),
        })?;
        self.emit(event);
        Ok(())
    }
}

/// Result of [`OperationContext::fan_out`].
#[derive(Debug, Default)]
pub struct FanOutReport {
    /// Sub-dispatches started.
    pub attempted: usize,
    /// Sub-dispatches that returned a value.
    pub succeeded: usize,
    /// Sub-dispatches cancelled by an interceptor.
    pub cancelled: usize,
    /// Failed sub-dispatches with their index in the input.
    pub failures: Vec<(usize, DispatchError)>,
}

impl FanOutReport {
    /// Returns `true` if nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
