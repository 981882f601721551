//! `workspace:switch`
//!
//! ```text
//! resolve (run, mandatory)    ─► workspace, previous (active workspace updated)
//! activate (run, best-effort) ─► view shown
//! emit workspace:switched
//! ```

use super::{encode, fields, optional, require};
use crate::intents::{
    SwitchWorkspace, SwitchWorkspaceRequest, WorkspaceSwitch, WorkspaceSwitched,
};
use crate::types::Workspace;
use async_trait::async_trait;
use hydra_runtime::{DispatchError, Operation, OperationContext};
use hydra_types::IntentKind;
use serde_json::Value;
use std::path::PathBuf;

pub struct SwitchWorkspaceOperation;

#[async_trait]
impl Operation for SwitchWorkspaceOperation {
    fn id(&self) -> &str {
        SwitchWorkspace::TYPE
    }

    async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
        let op = SwitchWorkspace::TYPE;
        let _request: SwitchWorkspaceRequest = ctx.payload()?;
        let mut hook_ctx = ctx.hook_context();

        ctx.run_mandatory("resolve", &mut hook_ctx).await?;
        let workspace: Workspace = require(&hook_ctx, op, fields::WORKSPACE)?;
        let previous: Option<PathBuf> = optional(&hook_ctx, fields::PREVIOUS);

        ctx.run_best_effort("activate", &mut hook_ctx).await;

        let switch = WorkspaceSwitch {
            previous,
            current: workspace.path,
        };
        ctx.emit_as::<WorkspaceSwitched>(&switch)?;
        encode(op, &switch)
    }
}
