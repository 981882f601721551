//! `project:close`
//!
//! ```text
//! teardown (collect, best-effort) ─► Teardown { stoppedEditors }
//! unregister (run, mandatory)     ─► closedProject
//! emit project:closed { path of the recorded project }
//! ```
//!
//! Teardown runs first so handlers still see the project's workspaces.

use super::{encode, fields, require};
use crate::intents::{
    CloseProject, CloseProjectRequest, ClosedProject, ProjectClosed, ProjectClosedEvent,
};
use crate::types::Project;
use async_trait::async_trait;
use hydra_hook::MergeResult;
use hydra_runtime::{DispatchError, Operation, OperationContext};
use hydra_types::IntentKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contribution of one `teardown` handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teardown {
    #[serde(default)]
    pub stopped_editors: Option<usize>,
}

impl MergeResult for Teardown {
    fn merge(&mut self, later: Self) {
        if later.stopped_editors.is_some() {
            self.stopped_editors = later.stopped_editors;
        }
    }
}

pub struct CloseProjectOperation;

#[async_trait]
impl Operation for CloseProjectOperation {
    fn id(&self) -> &str {
        CloseProject::TYPE
    }

    async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
        let op = CloseProject::TYPE;
        let _request: CloseProjectRequest = ctx.payload()?;
        let mut hook_ctx = ctx.hook_context();

        let teardown: Teardown = ctx.collect_best_effort("teardown", &mut hook_ctx).await;

        ctx.run_mandatory("unregister", &mut hook_ctx).await?;
        let project: Project = require(&hook_ctx, op, fields::CLOSED_PROJECT)?;

        let closed = ClosedProject {
            path: project.path.clone(),
            workspaces: project.workspaces.len(),
            stopped_editors: teardown.stopped_editors.unwrap_or(0),
        };

        // The recorded path, not the request's spelling of it.
        ctx.emit_as::<ProjectClosed>(&ProjectClosedEvent {
            path: project.path,
        })?;
        encode(op, &closed)
    }
}
