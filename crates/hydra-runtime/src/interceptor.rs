//! Interceptor chain run before every dispatch.
//!
//! Each interceptor may pass the intent through, rewrite it, or cancel
//! the dispatch by returning `None`. Cancellation is the engine's only
//! cancellation mechanism and is not an error.

use crate::DispatchError;
use async_trait::async_trait;
use hydra_types::Intent;
use serde_json::Value;
use std::sync::Arc;

/// How a dispatch settled, as seen by [`Interceptor::after`].
#[derive(Debug, Clone, Copy)]
pub enum DispatchOutcome<'a> {
    /// The Operation returned this value.
    Completed(&'a Value),
    /// Routing or the Operation failed.
    Failed(&'a DispatchError),
    /// An interceptor later in the chain cancelled the intent.
    Cancelled,
}

/// A chain-of-responsibility step run before every dispatch.
///
/// Interceptors are stateless from the engine's point of view; any state
/// (e.g. an in-progress key set) is owned by the interceptor value.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// Position in the chain (lower = earlier). Default: 100.
    fn order(&self) -> i32 {
        100
    }

    /// Returns the (possibly rewritten) intent, or `None` to cancel.
    async fn before(&self, intent: Intent) -> Option<Intent>;

    /// Called once the dispatch settles, for every interceptor whose
    /// `before` let the intent through. `intent` is the value this
    /// interceptor received, before its own rewrite.
    async fn after(&self, _intent: &Intent, _outcome: DispatchOutcome<'_>) {}
}

/// Interceptors sorted by `order`, ties kept in insertion order.
#[derive(Default, Clone)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `interceptor` after every entry with the same or lower order.
    pub fn insert(&mut self, interceptor: Arc<dyn Interceptor>) {
        let order = interceptor.order();
        let pos = self
            .interceptors
            .iter()
            .position(|i| i.order() > order)
            .unwrap_or(self.interceptors.len());
        self.interceptors.insert(pos, interceptor);
    }

    /// Interceptors in execution order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn Interceptor>> {
        self.interceptors.clone()
    }

    /// IDs in execution order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.interceptors.iter().map(|i| i.id().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

/// Test utilities for interceptors.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type BeforeFn = Box<dyn Fn(Intent) -> Option<Intent> + Send + Sync>;

    /// A scripted interceptor that counts `before` calls and records the
    /// outcomes passed to `after`.
    pub struct MockInterceptor {
        id: String,
        order: i32,
        before_fn: BeforeFn,
        /// Number of `before` calls.
        pub before_calls: Arc<AtomicUsize>,
        /// One entry per `after` call: `completed`, `failed` or `cancelled`.
        pub settled: Arc<Mutex<Vec<String>>>,
    }

    impl MockInterceptor {
        fn with_before(id: &str, before_fn: BeforeFn) -> Self {
            Self {
                id: id.to_string(),
                order: 100,
                before_fn,
                before_calls: Arc::new(AtomicUsize::new(0)),
                settled: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Lets every intent through unchanged.
        pub fn pass_through(id: &str) -> Self {
            Self::with_before(id, Box::new(Some::<Intent>))
        }

        /// Cancels every intent.
        pub fn cancelling(id: &str) -> Self {
            Self::with_before(id, Box::new(|_| None))
        }

        /// Applies `f` to every intent.
        pub fn rewriting(
            id: &str,
            f: impl Fn(Intent) -> Option<Intent> + Send + Sync + 'static,
        ) -> Self {
            Self::with_before(id, Box::new(f))
        }

        /// Sets the order.
        #[must_use]
        pub fn with_order(mut self, order: i32) -> Self {
            self.order = order;
            self
        }

        /// Number of `before` calls so far.
        pub fn calls(&self) -> usize {
            self.before_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Interceptor for MockInterceptor {
        fn id(&self) -> &str {
            &self.id
        }

        fn order(&self) -> i32 {
            self.order
        }

        async fn before(&self, intent: Intent) -> Option<Intent> {
            self.before_calls.fetch_add(1, Ordering::SeqCst);
            (self.before_fn)(intent)
        }

        async fn after(&self, _intent: &Intent, outcome: DispatchOutcome<'_>) {
            let label = match outcome {
                DispatchOutcome::Completed(_) => "completed",
                DispatchOutcome::Failed(_) => "failed",
                DispatchOutcome::Cancelled => "cancelled",
            };
            self.settled.lock().push(label.to_string());
        }
    }
}
