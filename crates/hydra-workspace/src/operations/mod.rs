//! The five workspace Operations.
//!
//! Each is a fixed script of hook points. The Operations never do the
//! work themselves: they order the points, apply the mandatory or
//! best-effort policy, check that the fields they need were written and
//! emit the success event.

mod close_project;
mod create_workspace;
mod open_project;
mod set_mode;
mod switch_workspace;

pub use close_project::{CloseProjectOperation, Teardown};
pub use create_workspace::CreateWorkspaceOperation;
pub use open_project::{Discovery, OpenProjectOperation};
pub use set_mode::SetModeOperation;
pub use switch_workspace::SwitchWorkspaceOperation;

use crate::WorkspaceError;
use hydra_hook::HookContext;
use hydra_runtime::{DispatchError, Dispatcher, Operation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Hook context field names shared by Operations and the modules that
/// fill them.
pub mod fields {
    /// `PathBuf`: resolved project root.
    pub const PROJECT_PATH: &str = "projectPath";
    /// `String`: display name of the project.
    pub const PROJECT_NAME: &str = "projectName";
    /// `String`: URL a remote project was cloned from.
    pub const REMOTE_URL: &str = "remoteUrl";
    /// `PathBuf`: the workspace's worktree.
    pub const WORKSPACE_PATH: &str = "workspacePath";
    /// `String`: checked-out branch.
    pub const BRANCH: &str = "branch";
    /// `bool`: the worktree already existed and was adopted.
    pub const ADOPTED: &str = "adopted";
    /// `String`: where the workspace's editor serves.
    pub const EDITOR_URL: &str = "editorUrl";
    /// `Workspace`: target of a switch.
    pub const WORKSPACE: &str = "workspace";
    /// `Option<PathBuf>`: workspace active before a switch.
    pub const PREVIOUS: &str = "previous";
    /// `Project`: the project removed by `project:close`.
    pub const CLOSED_PROJECT: &str = "closedProject";
    /// `UiMode`: mode before `ui:set-mode`.
    pub const PREVIOUS_MODE: &str = "previousMode";
}

/// All Operations, in a fixed order.
#[must_use]
pub fn operations() -> Vec<(&'static str, Arc<dyn Operation>)> {
    use crate::intents::{CloseProject, CreateWorkspace, OpenProject, SetMode, SwitchWorkspace};
    use hydra_types::IntentKind;

    vec![
        (OpenProject::TYPE, Arc::new(OpenProjectOperation) as Arc<dyn Operation>),
        (CreateWorkspace::TYPE, Arc::new(CreateWorkspaceOperation)),
        (CloseProject::TYPE, Arc::new(CloseProjectOperation)),
        (SwitchWorkspace::TYPE, Arc::new(SwitchWorkspaceOperation)),
        (SetMode::TYPE, Arc::new(SetModeOperation)),
    ]
}

/// Registers every workspace Operation on `dispatcher`.
pub fn register_operations(dispatcher: &Dispatcher) {
    for (intent_type, operation) in operations() {
        dispatcher.register_operation(intent_type, operation);
    }
}

/// Reads a field a mandatory point must have produced.
fn require<T: DeserializeOwned>(
    hook_ctx: &HookContext,
    operation: &str,
    field: &str,
) -> Result<T, DispatchError> {
    let value = hook_ctx
        .get::<T>(field)
        .map_err(|e| DispatchError::InvalidPayload {
            intent: operation.to_string(),
            message: format!("field '{field}': {e}"),
        })?;
    value.ok_or_else(|| {
        DispatchError::rejected(operation, &WorkspaceError::unresolved(operation, field))
    })
}

/// Reads an optional field, treating a malformed value as absent.
fn optional<T: DeserializeOwned>(hook_ctx: &HookContext, field: &str) -> Option<T> {
    hook_ctx.get::<T>(field).ok().flatten()
}

/// Encodes an Operation result.
fn encode<T: Serialize>(operation: &str, value: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|e| DispatchError::InvalidOutput {
        intent: operation.to_string(),
        message: e.to_string(),
    })
}
