//! `workspace:create`
//!
//! ```text
//! create (run, mandatory)     ─► workspacePath [branch, adopted]
//! setup (run, best-effort)    ─► keepfiles copied, editor started [editorUrl]
//! register (run, mandatory)   ─► workspace recorded under its project
//! emit workspace:created
//! ```

use super::{encode, fields, optional, require};
use crate::intents::{
    CreateWorkspace, CreateWorkspaceRequest, WorkspaceCreated, WorkspaceCreatedEvent,
};
use crate::types::Workspace;
use async_trait::async_trait;
use hydra_runtime::{DispatchError, Operation, OperationContext};
use hydra_types::IntentKind;
use serde_json::Value;
use std::path::PathBuf;

pub struct CreateWorkspaceOperation;

#[async_trait]
impl Operation for CreateWorkspaceOperation {
    fn id(&self) -> &str {
        CreateWorkspace::TYPE
    }

    async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
        let op = CreateWorkspace::TYPE;
        let request: CreateWorkspaceRequest = ctx.payload()?;
        let mut hook_ctx = ctx.hook_context();

        ctx.run_mandatory("create", &mut hook_ctx).await?;
        let path: PathBuf = require(&hook_ctx, op, fields::WORKSPACE_PATH)?;

        ctx.run_best_effort("setup", &mut hook_ctx).await;

        let workspace = Workspace {
            name: request.name,
            path,
            project_path: request.project_path,
            branch: optional(&hook_ctx, fields::BRANCH).or(request.branch),
            editor_url: optional(&hook_ctx, fields::EDITOR_URL),
        };
        hook_ctx
            .set(fields::WORKSPACE, &workspace)
            .map_err(|e| DispatchError::InvalidOutput {
                intent: op.to_string(),
                message: e.to_string(),
            })?;

        ctx.run_mandatory("register", &mut hook_ctx).await?;

        ctx.emit_as::<WorkspaceCreated>(&WorkspaceCreatedEvent {
            workspace: workspace.clone(),
        })?;
        encode(op, &workspace)
    }
}
