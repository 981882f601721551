//! Records projects and workspaces in [`AppState`] and resolves switch
//! targets against it.

use crate::intents::{
    CloseProject, CloseProjectRequest, CreateWorkspace, OpenProject, SwitchWorkspace,
    SwitchWorkspaceRequest,
};
use crate::operations::fields;
use crate::state::AppState;
use crate::types::{Project, Workspace};
use crate::WorkspaceError;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::path::PathBuf;
use std::sync::Arc;

pub const MODULE_NAME: &str = "app_state";

/// `project:open/register`
pub struct RegisterProject(Arc<AppState>);

#[async_trait]
impl HookHandler for RegisterProject {
    fn id(&self) -> &str {
        "app_state.register-project"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let path: PathBuf = ctx
            .get(fields::PROJECT_PATH)?
            .ok_or_else(|| WorkspaceError::unresolved(OpenProject::TYPE, fields::PROJECT_PATH))?;
        let project = Project {
            name: ctx
                .get(fields::PROJECT_NAME)?
                .unwrap_or_else(|| Project::name_for(&path)),
            remote_url: ctx.get(fields::REMOTE_URL)?,
            workspaces: Vec::new(),
            path,
        };

        let added = self.0.add_project(project);
        tracing::debug!(added, "project registered");
        Ok(None)
    }
}

/// `workspace:create/register`
pub struct RegisterWorkspace(Arc<AppState>);

#[async_trait]
impl HookHandler for RegisterWorkspace {
    fn id(&self) -> &str {
        "app_state.register-workspace"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let workspace: Workspace = ctx
            .get(fields::WORKSPACE)?
            .ok_or_else(|| WorkspaceError::unresolved(CreateWorkspace::TYPE, fields::WORKSPACE))?;
        self.0.add_workspace(workspace)?;
        Ok(None)
    }
}

/// `project:close/unregister`
pub struct UnregisterProject(Arc<AppState>);

#[async_trait]
impl HookHandler for UnregisterProject {
    fn id(&self) -> &str {
        "app_state.unregister-project"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let request: CloseProjectRequest = ctx.intent().payload_as()?;
        let project = self.0.remove_project(&request.path)?;
        ctx.set(fields::CLOSED_PROJECT, &project)?;
        Ok(None)
    }
}

/// `workspace:switch/resolve`
pub struct ResolveSwitch(Arc<AppState>);

#[async_trait]
impl HookHandler for ResolveSwitch {
    fn id(&self) -> &str {
        "app_state.resolve-switch"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let request: SwitchWorkspaceRequest = ctx.intent().payload_as()?;
        let (workspace, previous) = self.0.activate(&request.path)?;
        ctx.set(fields::WORKSPACE, &workspace)?;
        ctx.set(fields::PREVIOUS, &previous)?;
        Ok(None)
    }
}

#[must_use]
pub fn module(state: Arc<AppState>) -> IntentModule {
    IntentModule::new(MODULE_NAME)
        .hook(
            OpenProject::TYPE,
            "register",
            Arc::new(RegisterProject(state.clone())),
        )
        .hook(
            CreateWorkspace::TYPE,
            "register",
            Arc::new(RegisterWorkspace(state.clone())),
        )
        .hook(
            CloseProject::TYPE,
            "unregister",
            Arc::new(UnregisterProject(state.clone())),
        )
        .hook(
            SwitchWorkspace::TYPE,
            "resolve",
            Arc::new(ResolveSwitch(state)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_types::Intent;
    use serde_json::json;

    #[tokio::test]
    async fn register_records_resolved_project() {
        let state = Arc::new(AppState::new());
        let mut ctx = HookContext::new(Intent::new(OpenProject::TYPE, json!({})));
        ctx.set(fields::PROJECT_PATH, "/repo").expect("set");
        ctx.set(fields::REMOTE_URL, "https://h/o/repo").expect("set");

        RegisterProject(state.clone())
            .handle(&mut ctx)
            .await
            .expect("registers");

        let project = state.project("/repo".as_ref()).expect("open");
        assert_eq!(project.name, "repo");
        assert_eq!(project.remote_url.as_deref(), Some("https://h/o/repo"));
    }

    #[tokio::test]
    async fn unregister_unknown_project_fails() {
        let state = Arc::new(AppState::new());
        let mut ctx = HookContext::new(Intent::new(CloseProject::TYPE, json!({"path": "/nope"})));

        let err = UnregisterProject(state)
            .handle(&mut ctx)
            .await
            .expect_err("not open");
        assert_eq!(err.code.as_deref(), Some("WORKSPACE_UNKNOWN_PROJECT"));
    }

    #[test]
    fn module_covers_all_state_points() {
        let module = module(Arc::new(AppState::new()));
        assert_eq!(
            module.hook_points(),
            vec![
                ("project:open", "register"),
                ("workspace:create", "register"),
                ("project:close", "unregister"),
                ("workspace:switch", "resolve"),
            ]
        );
    }
}
