//! Hook registry: ordered handler lists per `(operation, point)`.
//!
//! Handler lists are append-only while modules are wired at startup and
//! read-only afterwards. Every invocation works on a snapshot of the list,
//! so no lock is held across a handler's `.await`.

use crate::{HookContext, HookError, HookHandler};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup key for a handler list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HookKey {
    operation: String,
    point: String,
}

impl HookKey {
    fn new(operation: &str, point: &str) -> Self {
        Self {
            operation: operation.to_string(),
            point: point.to_string(),
        }
    }
}

/// Outcome of a collect-mode invocation.
///
/// Both vectors are in handler registration order. A handler contributes
/// to exactly one of them.
#[derive(Debug)]
pub struct CollectOutcome<T> {
    /// Contributions of the handlers that succeeded.
    pub results: Vec<T>,
    /// Failures of the handlers that did not.
    pub errors: Vec<HookError>,
}

impl<T> Default for CollectOutcome<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Field-wise merge of collect-mode contributions.
///
/// Implementations follow "last defined field wins": a field set by a
/// later contribution replaces the earlier one, an unset field keeps it.
pub trait MergeResult: Default {
    /// Folds `later` into `self`.
    fn merge(&mut self, later: Self);
}

impl<T: MergeResult> CollectOutcome<T> {
    /// Mandatory-point policy: fail with the first error, otherwise merge
    /// every result.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure, in registration order.
    pub fn merged(self) -> Result<T, HookError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(fold(self.results))
    }

    /// Best-effort policy: merge what succeeded and hand back the errors
    /// for the caller to log.
    #[must_use]
    pub fn merged_lenient(self) -> (T, Vec<HookError>) {
        (fold(self.results), self.errors)
    }
}

fn fold<T: MergeResult>(results: Vec<T>) -> T {
    results.into_iter().fold(T::default(), |mut acc, next| {
        acc.merge(next);
        acc
    })
}

/// Central registry for hook handlers.
///
/// # Ordering
///
/// Handlers run in registration order. Registering the same handler twice
/// runs it twice. Module wiring order therefore decides execution order.
///
/// # Concurrency
///
/// Shared as `Arc<HookRegistry>`. `register()` takes a short write lock,
/// `run()`/`collect()` clone the handler list under a read lock and
/// release it before the first handler runs.
#[derive(Default)]
pub struct HookRegistry {
    handlers: RwLock<HashMap<HookKey, Vec<Arc<dyn HookHandler>>>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list for `(operation, point)`.
    pub fn register(&self, operation: &str, point: &str, handler: Arc<dyn HookHandler>) {
        tracing::debug!(
            operation,
            point,
            handler = handler.id(),
            "registering hook handler"
        );
        self.handlers
            .write()
            .entry(HookKey::new(operation, point))
            .or_default()
            .push(handler);
    }

    /// Snapshot of the handlers for `(operation, point)`.
    #[must_use]
    pub fn handlers(&self, operation: &str, point: &str) -> Vec<Arc<dyn HookHandler>> {
        self.handlers
            .read()
            .get(&HookKey::new(operation, point))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of handlers at `(operation, point)`.
    #[must_use]
    pub fn count(&self, operation: &str, point: &str) -> usize {
        self.handlers
            .read()
            .get(&HookKey::new(operation, point))
            .map_or(0, Vec::len)
    }

    /// Points of `operation` that have at least one handler, sorted.
    #[must_use]
    pub fn points(&self, operation: &str) -> Vec<String> {
        let mut points: Vec<String> = self
            .handlers
            .read()
            .iter()
            .filter(|(key, list)| key.operation == operation && !list.is_empty())
            .map(|(key, _)| key.point.clone())
            .collect();
        points.sort_unstable();
        points
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the handlers for `(operation, point)` in order against the
    /// shared context.
    ///
    /// Fail-fast within the point: the first failing handler's error is
    /// stored in `ctx.error` and the remaining handlers of this point are
    /// skipped. Handlers see every field written before them.
    pub async fn run(&self, operation: &str, point: &str, ctx: &mut HookContext) {
        for handler in self.handlers(operation, point) {
            tracing::trace!(operation, point, handler = handler.id(), "run handler");
            if let Err(source) = handler.handle(ctx).await {
                tracing::debug!(
                    operation,
                    point,
                    handler = handler.id(),
                    error = %source,
                    "hook handler failed, skipping rest of point"
                );
                ctx.error = Some(HookError::HandlerFailed {
                    operation: operation.to_string(),
                    point: point.to_string(),
                    handler: handler.id().to_string(),
                    source,
                });
                return;
            }
        }
    }

    /// Runs every handler for `(operation, point)` and gathers their
    /// contributions.
    ///
    /// A failing handler does not stop the next one. `None` from a
    /// handler that self-selected out becomes `T::default()`.
    pub async fn collect<T>(
        &self,
        operation: &str,
        point: &str,
        ctx: &mut HookContext,
    ) -> CollectOutcome<T>
    where
        T: DeserializeOwned + Default,
    {
        let mut outcome = CollectOutcome::default();

        for handler in self.handlers(operation, point) {
            tracing::trace!(operation, point, handler = handler.id(), "collect handler");
            match handler.handle(ctx).await {
                Ok(None) => outcome.results.push(T::default()),
                Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                    Ok(result) => outcome.results.push(result),
                    Err(e) => outcome.errors.push(HookError::InvalidResult {
                        operation: operation.to_string(),
                        point: point.to_string(),
                        handler: handler.id().to_string(),
                        message: e.to_string(),
                    }),
                },
                Err(source) => {
                    tracing::debug!(
                        operation,
                        point,
                        handler = handler.id(),
                        error = %source,
                        "hook handler failed, continuing collect"
                    );
                    outcome.errors.push(HookError::HandlerFailed {
                        operation: operation.to_string(),
                        point: point.to_string(),
                        handler: handler.id().to_string(),
                        source,
                    });
                }
            }
        }

        outcome
    }

    /// Returns a view of this registry fixed to one operation.
    #[must_use]
    pub fn bind(self: &Arc<Self>, operation: impl Into<String>) -> BoundHooks {
        BoundHooks {
            registry: Arc::clone(self),
            operation: operation.into(),
        }
    }
}

/// A registry view bound to one operation ID.
///
/// This is what an Operation sees: it names hook points only.
#[derive(Clone)]
pub struct BoundHooks {
    registry: Arc<HookRegistry>,
    operation: String,
}

impl BoundHooks {
    /// The operation this view is bound to.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// See [`HookRegistry::run`].
    pub async fn run(&self, point: &str, ctx: &mut HookContext) {
        self.registry.run(&self.operation, point, ctx).await;
    }

    /// See [`HookRegistry::collect`].
    pub async fn collect<T>(&self, point: &str, ctx: &mut HookContext) -> CollectOutcome<T>
    where
        T: DeserializeOwned + Default,
    {
        self.registry.collect(&self.operation, point, ctx).await
    }

    /// Number of handlers at `point`.
    #[must_use]
    pub fn count(&self, point: &str) -> usize {
        self.registry.count(&self.operation, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing::MockHandler;
    use crate::HandlerError;
    use hydra_types::Intent;
    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    const OP: &str = "project:open";

    fn ctx() -> HookContext {
        HookContext::new(Intent::new(OP, json!({"kind": "local", "path": "/repo"})))
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Opinion {
        name: Option<String>,
        branch: Option<String>,
    }

    impl MergeResult for Opinion {
        fn merge(&mut self, later: Self) {
            if later.name.is_some() {
                self.name = later.name;
            }
            if later.branch.is_some() {
                self.branch = later.branch;
            }
        }
    }

    // ── run ──────────────────────────────────────────────────

    #[tokio::test]
    async fn run_without_handlers_is_noop() {
        let reg = HookRegistry::new();
        let mut ctx = ctx();
        reg.run(OP, "resolve", &mut ctx).await;
        assert!(ctx.error.is_none());
        assert!(ctx.field_names().is_empty());
    }

    #[tokio::test]
    async fn run_executes_in_registration_order() {
        let reg = HookRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for id in ["first", "second", "third"] {
            reg.register(OP, "resolve", Arc::new(MockHandler::noop(id).logging_to(&log)));
        }

        reg.run(OP, "resolve", &mut ctx()).await;

        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn later_handlers_see_earlier_writes() {
        let reg = HookRegistry::new();
        reg.register(
            OP,
            "resolve",
            Arc::new(MockHandler::modifier("writer", |ctx| {
                ctx.insert("projectPath", json!("/repo"));
            })),
        );
        reg.register(
            OP,
            "resolve",
            Arc::new(MockHandler::scripted("reader", |ctx| {
                let path: Option<String> = ctx.get("projectPath")?;
                ctx.set("seen", &path)?;
                Ok(None)
            })),
        );

        let mut ctx = ctx();
        reg.run(OP, "resolve", &mut ctx).await;

        assert_eq!(ctx.field("seen"), Some(&json!("/repo")));
    }

    #[tokio::test]
    async fn run_stops_point_on_first_failure() {
        let reg = HookRegistry::new();
        let (after, after_calls) = MockHandler::noop("after").into_shared();
        reg.register(OP, "resolve", Arc::new(MockHandler::failing("boom", "no such path")));
        reg.register(OP, "resolve", after);

        let mut ctx = ctx();
        reg.run(OP, "resolve", &mut ctx).await;

        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
        let err = ctx.error.expect("failure should be captured");
        assert_eq!(err.handler(), "boom");
        assert_eq!(
            err.handler_error(),
            Some(&HandlerError::new("no such path"))
        );
    }

    #[tokio::test]
    async fn failure_does_not_block_next_point() {
        let reg = HookRegistry::new();
        let (next, next_calls) = MockHandler::noop("next").into_shared();
        reg.register(OP, "first", Arc::new(MockHandler::failing("boom", "x")));
        reg.register(OP, "second", next);

        let mut ctx = ctx();
        reg.run(OP, "first", &mut ctx).await;
        reg.run(OP, "second", &mut ctx).await;

        assert_eq!(next_calls.load(Ordering::SeqCst), 1);
        assert!(ctx.error.is_some());
    }

    #[tokio::test]
    async fn duplicate_registration_runs_twice() {
        let reg = HookRegistry::new();
        let (handler, calls) = MockHandler::noop("dup").into_shared();
        reg.register(OP, "resolve", Arc::clone(&handler));
        reg.register(OP, "resolve", handler);

        reg.run(OP, "resolve", &mut ctx()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handlers_are_scoped_by_operation() {
        let reg = HookRegistry::new();
        let (handler, calls) = MockHandler::noop("other").into_shared();
        reg.register("project:close", "resolve", handler);

        reg.run(OP, "resolve", &mut ctx()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // ── collect ──────────────────────────────────────────────

    #[tokio::test]
    async fn collect_isolates_failures() {
        let reg = HookRegistry::new();
        let (last, last_calls) =
            MockHandler::returning("c", json!({"branch": "main"})).into_shared();
        reg.register(
            OP,
            "discover",
            Arc::new(MockHandler::returning("a", json!({"name": "repo"}))),
        );
        reg.register(OP, "discover", Arc::new(MockHandler::failing("b", "offline")));
        reg.register(OP, "discover", last);

        let outcome: CollectOutcome<Opinion> = reg.collect(OP, "discover", &mut ctx()).await;

        assert_eq!(last_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].name.as_deref(), Some("repo"));
        assert_eq!(outcome.results[1].branch.as_deref(), Some("main"));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].handler(), "b");
    }

    #[tokio::test]
    async fn collect_self_selected_out_yields_default() {
        let reg = HookRegistry::new();
        reg.register(OP, "discover", Arc::new(MockHandler::noop("skip")));

        let outcome: CollectOutcome<Opinion> = reg.collect(OP, "discover", &mut ctx()).await;

        assert_eq!(outcome.results, vec![Opinion::default()]);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn collect_invalid_shape_is_error() {
        let reg = HookRegistry::new();
        reg.register(OP, "discover", Arc::new(MockHandler::returning("bad", json!({"name": 7}))));

        let outcome: CollectOutcome<Opinion> = reg.collect(OP, "discover", &mut ctx()).await;

        assert!(outcome.results.is_empty());
        assert!(matches!(outcome.errors[0], HookError::InvalidResult { .. }));
    }

    #[test]
    fn merged_is_last_defined_field_wins() {
        let outcome = CollectOutcome {
            results: vec![
                Opinion {
                    name: Some("a".into()),
                    branch: Some("main".into()),
                },
                Opinion {
                    name: Some("b".into()),
                    branch: None,
                },
            ],
            errors: Vec::new(),
        };

        let merged = outcome.merged().expect("no errors");
        assert_eq!(merged.name.as_deref(), Some("b"));
        assert_eq!(merged.branch.as_deref(), Some("main"));
    }

    #[test]
    fn merged_fails_with_first_error() {
        let first = HookError::InvalidResult {
            operation: OP.into(),
            point: "discover".into(),
            handler: "first".into(),
            message: "x".into(),
        };
        let mut second = first.clone();
        if let HookError::InvalidResult { handler, .. } = &mut second {
            *handler = "second".into();
        }
        let outcome: CollectOutcome<Opinion> = CollectOutcome {
            results: vec![Opinion::default()],
            errors: vec![first, second],
        };

        let err = outcome.merged().expect_err("errors present");
        assert_eq!(err.handler(), "first");
    }

    #[test]
    fn merged_lenient_keeps_results() {
        let outcome = CollectOutcome {
            results: vec![Opinion {
                name: Some("kept".into()),
                branch: None,
            }],
            errors: vec![HookError::InvalidResult {
                operation: OP.into(),
                point: "teardown".into(),
                handler: "h".into(),
                message: "x".into(),
            }],
        };

        let (merged, errors) = outcome.merged_lenient();
        assert_eq!(merged.name.as_deref(), Some("kept"));
        assert_eq!(errors.len(), 1);
    }

    // ── introspection ────────────────────────────────────────

    #[test]
    fn counts_and_points() {
        let reg = HookRegistry::new();
        assert!(reg.is_empty());
        reg.register(OP, "resolve", Arc::new(MockHandler::noop("a")));
        reg.register(OP, "discover", Arc::new(MockHandler::noop("b")));
        reg.register(OP, "discover", Arc::new(MockHandler::noop("c")));

        assert_eq!(reg.len(), 3);
        assert_eq!(reg.count(OP, "discover"), 2);
        assert_eq!(reg.points(OP), vec!["discover", "resolve"]);
        assert!(reg.points("ui:set-mode").is_empty());
    }

    #[tokio::test]
    async fn bound_view_targets_its_operation() {
        let reg = Arc::new(HookRegistry::new());
        let (handler, calls) = MockHandler::noop("a").into_shared();
        reg.register(OP, "resolve", handler);

        let hooks = reg.bind(OP);
        hooks.run("resolve", &mut ctx()).await;

        assert_eq!(hooks.operation(), OP);
        assert_eq!(hooks.count("resolve"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
