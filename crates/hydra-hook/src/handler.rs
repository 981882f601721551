//! Hook handler trait and testing utilities.

use crate::{HandlerError, HookContext};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// What a handler produces.
///
/// - run mode: the value is ignored, handlers communicate by writing
///   fields on the context
/// - collect mode: `Some(v)` is this handler's contribution, `None` means
///   the handler self-selected out and contributes an empty result
pub type HandlerResult = Result<Option<Value>, HandlerError>;

/// A single hook handler contributed by a module.
///
/// Handlers must be safe to call when they do not apply to the intent:
/// such a handler returns `Ok(None)` without touching the context. They
/// must not keep references to the context beyond their own call.
///
/// # Thread Safety
///
/// Handlers are shared through `Arc` between the registry and every
/// concurrent dispatch, so they must be `Send + Sync`. Mutable state
/// belongs behind the handler's own lock.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Identifier used in logs and error messages.
    fn id(&self) -> &str;

    /// Runs the handler.
    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult;
}

/// Adapter for handlers that never await.
struct FnHandler<F> {
    id: String,
    f: F,
}

#[async_trait]
impl<F> HookHandler for FnHandler<F>
where
    F: Fn(&mut HookContext) -> HandlerResult + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        (self.f)(ctx)
    }
}

/// Wraps a synchronous closure as a handler.
///
/// ```
/// use hydra_hook::{from_fn, HookContext, HookHandler};
///
/// let handler = from_fn("mark", |ctx: &mut HookContext| {
///     ctx.set("marked", &true)?;
///     Ok(None)
/// });
/// assert_eq!(handler.id(), "mark");
/// ```
pub fn from_fn<F>(id: impl Into<String>, f: F) -> Arc<dyn HookHandler>
where
    F: Fn(&mut HookContext) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FnHandler { id: id.into(), f })
}

/// Test utilities for the hook system.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type ActionFn = Box<dyn Fn(&mut HookContext) -> HandlerResult + Send + Sync>;

    /// A scripted handler that counts its calls and optionally records its
    /// ID into a shared log.
    pub struct MockHandler {
        /// Handler ID.
        pub id: String,
        action_fn: ActionFn,
        /// Number of times `handle()` has been called.
        pub call_count: Arc<AtomicUsize>,
        log: Option<Arc<Mutex<Vec<String>>>>,
    }

    impl MockHandler {
        fn with_action(id: &str, action_fn: ActionFn) -> Self {
            Self {
                id: id.to_string(),
                action_fn,
                call_count: Arc::new(AtomicUsize::new(0)),
                log: None,
            }
        }

        /// Does nothing and returns `Ok(None)`.
        pub fn noop(id: &str) -> Self {
            Self::with_action(id, Box::new(|_| Ok(None)))
        }

        /// Applies `modifier` to the context.
        pub fn modifier(
            id: &str,
            modifier: impl Fn(&mut HookContext) + Send + Sync + 'static,
        ) -> Self {
            Self::with_action(
                id,
                Box::new(move |ctx| {
                    modifier(ctx);
                    Ok(None)
                }),
            )
        }

        /// Fails with `message`.
        pub fn failing(id: &str, message: &str) -> Self {
            let message = message.to_string();
            Self::with_action(id, Box::new(move |_| Err(HandlerError::new(message.clone()))))
        }

        /// Returns `value` as its collect-mode contribution.
        pub fn returning(id: &str, value: Value) -> Self {
            Self::with_action(id, Box::new(move |_| Ok(Some(value.clone()))))
        }

        /// Runs an arbitrary closure.
        pub fn scripted(
            id: &str,
            f: impl Fn(&mut HookContext) -> HandlerResult + Send + Sync + 'static,
        ) -> Self {
            Self::with_action(id, Box::new(f))
        }

        /// Appends this handler's ID to `log` on every call.
        #[must_use]
        pub fn logging_to(mut self, log: &Arc<Mutex<Vec<String>>>) -> Self {
            self.log = Some(Arc::clone(log));
            self
        }

        /// Returns the number of times this handler has run.
        pub fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Converts into a shareable handler, returning the call counter.
        pub fn into_shared(self) -> (Arc<dyn HookHandler>, Arc<AtomicUsize>) {
            let counter = Arc::clone(&self.call_count);
            (Arc::new(self), counter)
        }
    }

    #[async_trait]
    impl HookHandler for MockHandler {
        fn id(&self) -> &str {
            &self.id
        }

        async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(log) = &self.log {
                log.lock().push(self.id.clone());
            }
            (self.action_fn)(ctx)
        }
    }
}
