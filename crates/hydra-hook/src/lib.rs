//! Hook registry for the hydra intent engine.
//!
//! # Overview
//!
//! An Operation runs a fixed script of named hook points. Modules
//! contribute handlers to `(operation, point)` pairs at startup; the
//! [`HookRegistry`] keeps them in registration order and offers two ways
//! to invoke them.
//!
//! ## run: shared mutable context
//!
//! ```text
//! HookContext ─► handler 1 ─► handler 2 ─► handler 3
//!                  writes      reads 1      ✗ fails ─► ctx.error, stop
//! ```
//!
//! For multi-step pipelines where later steps need what earlier ones
//! wrote. The first failure is captured into `ctx.error` and the rest of
//! that point is skipped. Later points still run; the Operation decides
//! whether the error is fatal.
//!
//! ## collect: one result per handler
//!
//! ```text
//! handler 1 ─► Ok(r1) ┐
//! handler 2 ─► Err(e) ├─► CollectOutcome { results: [r1, r3], errors: [e] }
//! handler 3 ─► Ok(r3) ┘
//! ```
//!
//! For points where independent handlers each contribute an opinion.
//! Every handler runs regardless of earlier failures.
//!
//! ## Self-selection
//!
//! Several handlers may share one point, each responsible for a
//! different shape of intent. A handler that does not apply returns
//! `Ok(None)` and leaves the context alone.
//!
//! # Example
//!
//! ```
//! use hydra_hook::{from_fn, HookContext, HookRegistry};
//! use hydra_types::Intent;
//! use serde_json::json;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let registry = HookRegistry::new();
//! registry.register(
//!     "project:open",
//!     "resolve",
//!     from_fn("local", |ctx: &mut HookContext| {
//!         if ctx.intent().payload()["kind"] != "local" {
//!             return Ok(None);
//!         }
//!         let path = ctx.intent().payload()["path"].clone();
//!         ctx.insert("projectPath", path);
//!         Ok(None)
//!     }),
//! );
//!
//! let mut ctx = HookContext::new(Intent::new(
//!     "project:open",
//!     json!({"kind": "local", "path": "/repo"}),
//! ));
//! registry.run("project:open", "resolve", &mut ctx).await;
//! assert_eq!(ctx.field("projectPath"), Some(&json!("/repo")));
//! # });
//! # }
//! ```

mod context;
mod error;
pub mod handler;
mod registry;

pub use context::HookContext;
pub use error::{HandlerError, HookError};
pub use handler::{from_fn, HandlerResult, HookHandler};
pub use registry::{BoundHooks, CollectOutcome, HookRegistry, MergeResult};

pub mod testing {
    //! Test utilities for the hook system.
    //!
    //! Provides [`MockHandler`] for use in tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub use crate::handler::testing::MockHandler;
}
