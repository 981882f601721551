//! Workspace domain errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`WorkspaceError::PathNotFound`] | `WORKSPACE_PATH_NOT_FOUND` | No |
//! | [`WorkspaceError::NotADirectory`] | `WORKSPACE_NOT_A_DIRECTORY` | No |
//! | [`WorkspaceError::InvalidUrl`] | `WORKSPACE_INVALID_URL` | No |
//! | [`WorkspaceError::CloneFailed`] | `WORKSPACE_CLONE_FAILED` | Yes |
//! | [`WorkspaceError::Git`] | `WORKSPACE_GIT_FAILED` | Yes |
//! | [`WorkspaceError::UnknownProject`] | `WORKSPACE_UNKNOWN_PROJECT` | No |
//! | [`WorkspaceError::UnknownWorkspace`] | `WORKSPACE_UNKNOWN_WORKSPACE` | No |
//! | [`WorkspaceError::Unresolved`] | `WORKSPACE_UNRESOLVED` | No |
//! | [`WorkspaceError::Io`] | `WORKSPACE_IO` | Yes |
//! | [`WorkspaceError::Editor`] | `WORKSPACE_EDITOR_FAILED` | Yes |
//! | [`WorkspaceError::View`] | `WORKSPACE_VIEW_FAILED` | Yes |
//! | [`WorkspaceError::InvalidMode`] | `WORKSPACE_INVALID_MODE` | No |

use hydra_hook::HandlerError;
use hydra_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid repository url '{0}'")]
    InvalidUrl(String),

    #[error("failed to clone '{url}': {message}")]
    CloneFailed { url: String, message: String },

    /// A git invocation failed.
    #[error("git {operation} failed: {message}")]
    Git { operation: String, message: String },

    #[error("project is not open: {0}")]
    UnknownProject(String),

    #[error("no workspace at {0}")]
    UnknownWorkspace(String),

    /// No handler produced a field the Operation requires.
    #[error("{operation}: no handler produced '{field}'")]
    Unresolved { operation: String, field: String },

    #[error("i/o error at {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("editor: {0}")]
    Editor(String),

    #[error("view: {0}")]
    View(String),

    #[error("unknown ui mode '{0}' (expected workspace, shortcut or dialog)")]
    InvalidMode(String),
}

impl WorkspaceError {
    pub fn unresolved(operation: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Unresolved {
            operation: operation.into(),
            field: field.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for WorkspaceError {
    fn code(&self) -> &'static str {
        match self {
            Self::PathNotFound(_) => "WORKSPACE_PATH_NOT_FOUND",
            Self::NotADirectory(_) => "WORKSPACE_NOT_A_DIRECTORY",
            Self::InvalidUrl(_) => "WORKSPACE_INVALID_URL",
            Self::CloneFailed { .. } => "WORKSPACE_CLONE_FAILED",
            Self::Git { .. } => "WORKSPACE_GIT_FAILED",
            Self::UnknownProject(_) => "WORKSPACE_UNKNOWN_PROJECT",
            Self::UnknownWorkspace(_) => "WORKSPACE_UNKNOWN_WORKSPACE",
            Self::Unresolved { .. } => "WORKSPACE_UNRESOLVED",
            Self::Io { .. } => "WORKSPACE_IO",
            Self::Editor(_) => "WORKSPACE_EDITOR_FAILED",
            Self::View(_) => "WORKSPACE_VIEW_FAILED",
            Self::InvalidMode(_) => "WORKSPACE_INVALID_MODE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CloneFailed { .. }
                | Self::Git { .. }
                | Self::Io { .. }
                | Self::Editor(_)
                | Self::View(_)
        )
    }
}

impl From<WorkspaceError> for HandlerError {
    fn from(err: WorkspaceError) -> Self {
        HandlerError::coded(&err)
    }
}
