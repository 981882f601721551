//! Error types for the hook system.

use hydra_types::ErrorCode;
use thiserror::Error;

/// What a handler returns when it fails.
///
/// Carries the handler's own message and, optionally, the domain code of
/// the underlying failure (e.g. `WORKSPACE_NOT_A_DIRECTORY`) so the code
/// survives the trip through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable message.
    pub message: String,
    /// Machine code of the underlying failure, if it has one.
    pub code: Option<String>,
}

impl HandlerError {
    /// Creates an error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a machine code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Builds a handler error from any coded error.
    pub fn coded<E: ErrorCode + std::fmt::Display>(err: &E) -> Self {
        Self::new(err.to_string()).with_code(err.code())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("invalid hook field: {err}")).with_code("HOOK_INVALID_FIELD")
    }
}

/// Errors produced by the registry while invoking handlers.
///
/// Both variants name the `(operation, point, handler)` triple that
/// failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A handler returned `Err`.
    #[error("hook handler failed [{operation}/{point}/{handler}]: {source}")]
    HandlerFailed {
        operation: String,
        point: String,
        handler: String,
        #[source]
        source: HandlerError,
    },

    /// A collect-mode handler returned a value that does not decode into
    /// the result type the Operation declared.
    #[error("hook handler returned an invalid result [{operation}/{point}/{handler}]: {message}")]
    InvalidResult {
        operation: String,
        point: String,
        handler: String,
        message: String,
    },
}

impl HookError {
    /// ID of the handler that failed.
    #[must_use]
    pub fn handler(&self) -> &str {
        match self {
            Self::HandlerFailed { handler, .. } | Self::InvalidResult { handler, .. } => handler,
        }
    }

    /// The handler's own error, when it returned one.
    #[must_use]
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            Self::HandlerFailed { source, .. } => Some(source),
            Self::InvalidResult { .. } => None,
        }
    }

    /// The most specific code available: the handler's domain code if it
    /// set one, otherwise this error's own code.
    #[must_use]
    pub fn detail_code(&self) -> &str {
        self.handler_error()
            .and_then(|e| e.code.as_deref())
            .unwrap_or_else(|| self.code())
    }
}

impl ErrorCode for HookError {
    fn code(&self) -> &'static str {
        match self {
            Self::HandlerFailed { .. } => "HOOK_HANDLER_FAILED",
            Self::InvalidResult { .. } => "HOOK_INVALID_RESULT",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::HandlerFailed { .. })
    }
}
