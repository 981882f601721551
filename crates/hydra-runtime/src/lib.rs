//! Intent dispatch runtime.
//!
//! ```text
//!                ┌──────────────────────── Dispatcher ───────────────────────┐
//! Intent ──────► │ interceptors ─► Operation.execute(ctx) ─► result          │ ──► Option<Value>
//!                │      │                 │       │                          │
//!                │   cancel ─► None       │       └─► ctx.emit ─► EventBus ──┼──► subscribers
//!                │                        │                                  │
//!                │          ctx.hooks ◄───┘ ctx.dispatch (depth + 1) ─► ↺    │
//!                └───────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`Dispatcher`]: one [`Operation`] per intent type, an ordered
//!   [`Interceptor`] chain and the event subscriber table.
//! - [`OperationContext`]: what an Operation sees. Bound hooks, recursive
//!   dispatch and event emission, plus helpers for the mandatory and
//!   best-effort hook point policies and continue-on-error fan-out.
//! - [`IntentModule`] / [`wire_modules`]: the single startup pass that
//!   registers plugin contributions. Module order is handler order.
//! - [`IdempotencyGuard`]: an interceptor + subscriber pair that cancels
//!   duplicate in-flight intents.
//! - [`config`]: layered TOML configuration.
//!
//! Everything is constructed explicitly and passed by reference. The
//! engine holds no global state.

pub mod config;
mod dispatcher;
mod error;
mod eventbus;
mod idempotency;
pub mod interceptor;
mod module;
mod operation;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use dispatcher::{Dispatcher, DEFAULT_MAX_DEPTH};
pub use error::DispatchError;
pub use eventbus::{EventBus, EventHandler, Subscription};
pub use idempotency::{IdempotencyGuard, IdempotencyGuardBuilder, GUARD_ORDER};
pub use interceptor::{DispatchOutcome, Interceptor, InterceptorChain};
pub use module::{wire_modules, IntentModule, WiringReport};
pub use operation::{FanOutReport, Operation, OperationContext};
