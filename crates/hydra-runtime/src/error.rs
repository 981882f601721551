//! Dispatch layer errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`DispatchError::UnknownIntent`] | `DISPATCH_UNKNOWN_INTENT` | No |
//! | [`DispatchError::Hook`] | `DISPATCH_HOOK_FAILED` | Yes |
//! | [`DispatchError::Rejected`] | `DISPATCH_REJECTED` | No |
//! | [`DispatchError::InvalidPayload`] | `DISPATCH_INVALID_PAYLOAD` | No |
//! | [`DispatchError::InvalidOutput`] | `DISPATCH_INVALID_OUTPUT` | No |
//! | [`DispatchError::DepthExceeded`] | `DISPATCH_DEPTH_EXCEEDED` | No |
//!
//! Only routing errors and mandatory-hook errors are expected to reach
//! the caller of `dispatch`. Everything else the engine swallows by
//! policy never becomes a `DispatchError` in the first place.

use hydra_hook::HookError;
use hydra_types::ErrorCode;
use thiserror::Error;

/// Error returned from `Dispatcher::dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No Operation is registered for the intent type.
    #[error("no operation registered for intent '{0}'")]
    UnknownIntent(String),

    /// A mandatory hook point failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The Operation refused the intent after its hooks ran, e.g. a
    /// mandatory field was never populated.
    #[error("{intent} rejected: {message}")]
    Rejected {
        intent: String,
        message: String,
        /// Domain code of the refusal.
        reason: String,
    },

    /// The payload does not have the shape the Operation expects.
    #[error("invalid payload for '{intent}': {message}")]
    InvalidPayload { intent: String, message: String },

    /// The Operation result does not decode into the caller's type.
    #[error("invalid output from '{intent}': {message}")]
    InvalidOutput { intent: String, message: String },

    /// Sub-dispatch nested deeper than the configured limit.
    #[error("dispatch depth exceeded for '{intent}' (depth={depth}, max={max_depth})")]
    DepthExceeded {
        intent: String,
        depth: usize,
        max_depth: usize,
    },
}

impl DispatchError {
    /// Builds a [`DispatchError::Rejected`] from a coded domain error.
    pub fn rejected<E: ErrorCode + std::fmt::Display>(intent: impl Into<String>, err: &E) -> Self {
        Self::Rejected {
            intent: intent.into(),
            message: err.to_string(),
            reason: err.code().to_string(),
        }
    }

    /// The most specific code available.
    ///
    /// For hook failures this is the failing handler's own code when it
    /// set one; for rejections it is the domain reason.
    #[must_use]
    pub fn detail_code(&self) -> &str {
        match self {
            Self::Hook(err) => err.detail_code(),
            Self::Rejected { reason, .. } => reason,
            other => other.code(),
        }
    }

    /// Short classification for transport: `routing`, `hook`, `operation`
    /// or `engine`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownIntent(_) => "routing",
            Self::Hook(_) => "hook",
            Self::Rejected { .. } | Self::InvalidPayload { .. } => "operation",
            Self::InvalidOutput { .. } | Self::DepthExceeded { .. } => "engine",
        }
    }
}

impl ErrorCode for DispatchError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownIntent(_) => "DISPATCH_UNKNOWN_INTENT",
            Self::Hook(_) => "DISPATCH_HOOK_FAILED",
            Self::Rejected { .. } => "DISPATCH_REJECTED",
            Self::InvalidPayload { .. } => "DISPATCH_INVALID_PAYLOAD",
            Self::InvalidOutput { .. } => "DISPATCH_INVALID_OUTPUT",
            Self::DepthExceeded { .. } => "DISPATCH_DEPTH_EXCEEDED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Hook(err) => err.is_recoverable(),
            _ => false,
        }
    }
}
