//! Intent and event descriptors for the workspace operations.
//!
//! | Intent | Payload | Output | Success event |
//! |--------|---------|--------|---------------|
//! | `project:open` | [`ProjectSource`] | [`Project`] | `project:opened` |
//! | `workspace:create` | [`CreateWorkspaceRequest`] | [`Workspace`] | `workspace:created` |
//! | `project:close` | [`CloseProjectRequest`] | [`ClosedProject`] | `project:closed` |
//! | `workspace:switch` | [`SwitchWorkspaceRequest`] | [`WorkspaceSwitch`] | `workspace:switched` |
//! | `ui:set-mode` | [`SetModeRequest`] | [`ModeChange`] | `ui:mode-changed` |

use crate::types::{Project, ProjectSource, UiMode, Workspace};
use hydra_types::{EventKind, IntentKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Payloads and results ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    pub project_path: PathBuf,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// An existing worktree to adopt instead of creating one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseProjectRequest {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedProject {
    pub path: PathBuf,
    /// Workspaces the project had when it was closed.
    pub workspaces: usize,
    /// Editor servers stopped during teardown.
    pub stopped_editors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchWorkspaceRequest {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSwitch {
    pub previous: Option<PathBuf>,
    pub current: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModeRequest {
    pub mode: UiMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeChange {
    pub mode: UiMode,
    pub previous_mode: UiMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOpenedEvent {
    pub project: Project,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCreatedEvent {
    pub workspace: Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectClosedEvent {
    pub path: PathBuf,
}

// ── Intents ──────────────────────────────────────────────────

pub struct OpenProject;

impl IntentKind for OpenProject {
    const TYPE: &'static str = "project:open";
    type Payload = ProjectSource;
    type Output = Project;
}

pub struct CreateWorkspace;

impl IntentKind for CreateWorkspace {
    const TYPE: &'static str = "workspace:create";
    type Payload = CreateWorkspaceRequest;
    type Output = Workspace;
}

pub struct CloseProject;

impl IntentKind for CloseProject {
    const TYPE: &'static str = "project:close";
    type Payload = CloseProjectRequest;
    type Output = ClosedProject;
}

pub struct SwitchWorkspace;

impl IntentKind for SwitchWorkspace {
    const TYPE: &'static str = "workspace:switch";
    type Payload = SwitchWorkspaceRequest;
    type Output = WorkspaceSwitch;
}

pub struct SetMode;

impl IntentKind for SetMode {
    const TYPE: &'static str = "ui:set-mode";
    type Payload = SetModeRequest;
    type Output = ModeChange;
}

// ── Events ───────────────────────────────────────────────────

pub struct ProjectOpened;

impl EventKind for ProjectOpened {
    const TYPE: &'static str = "project:opened";
    type Payload = ProjectOpenedEvent;
}

pub struct WorkspaceCreated;

impl EventKind for WorkspaceCreated {
    const TYPE: &'static str = "workspace:created";
    type Payload = WorkspaceCreatedEvent;
}

pub struct ProjectClosed;

impl EventKind for ProjectClosed {
    const TYPE: &'static str = "project:closed";
    type Payload = ProjectClosedEvent;
}

pub struct WorkspaceSwitched;

impl EventKind for WorkspaceSwitched {
    const TYPE: &'static str = "workspace:switched";
    type Payload = WorkspaceSwitch;
}

pub struct ModeChanged;

impl EventKind for ModeChanged {
    const TYPE: &'static str = "ui:mode-changed";
    type Payload = ModeChange;
}

/// Every intent type this crate registers an Operation for.
pub const INTENT_TYPES: [&str; 5] = [
    OpenProject::TYPE,
    CreateWorkspace::TYPE,
    CloseProject::TYPE,
    SwitchWorkspace::TYPE,
    SetMode::TYPE,
];

/// Every event type this crate's Operations emit.
pub const EVENT_TYPES: [&str; 5] = [
    ProjectOpened::TYPE,
    WorkspaceCreated::TYPE,
    ProjectClosed::TYPE,
    WorkspaceSwitched::TYPE,
    ModeChanged::TYPE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_change_wire_shape() {
        let change = ModeChange {
            mode: UiMode::Shortcut,
            previous_mode: UiMode::Workspace,
        };
        assert_eq!(
            serde_json::to_value(change).expect("encode"),
            json!({"mode": "shortcut", "previousMode": "workspace"})
        );
    }

    #[test]
    fn create_request_optional_fields() {
        let req: CreateWorkspaceRequest =
            serde_json::from_value(json!({"projectPath": "/repo", "name": "feat"}))
                .expect("decode");
        assert!(req.branch.is_none());
        assert!(req.path.is_none());
    }
}
