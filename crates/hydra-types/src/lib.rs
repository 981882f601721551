//! Core message types for the hydra intent engine.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ hydra-types    : Intent, DomainEvent, ErrorCode│ ◄── HERE
//! ├───────────────────────────────────────────────┤
//! │ hydra-hook     : HookRegistry (run / collect)  │
//! ├───────────────────────────────────────────────┤
//! │ hydra-runtime  : Dispatcher, Operation, wiring │
//! ├───────────────────────────────────────────────┤
//! │ hydra-workspace: concrete operations + modules │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! These types carry no behavior. Everything that routes, runs or
//! observes them lives in the layers above.

mod error;
mod event;
mod intent;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use event::{DomainEvent, EventKind};
pub use intent::{Intent, IntentKind};
