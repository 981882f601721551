//! `project:open`
//!
//! ```text
//! resolve (run, mandatory)      ─► projectPath [projectName, remoteUrl]
//! discover (collect, mandatory) ─► Discovery { workspaces }
//! register (run, mandatory)     ─► project recorded as open
//! fan-out workspace:create      ─► one per discovered worktree, continue-on-error
//! emit project:opened
//! ```

use super::{encode, fields, optional, require};
use crate::intents::{
    CreateWorkspace, CreateWorkspaceRequest, OpenProject, ProjectOpened, ProjectOpenedEvent,
};
use crate::types::{DiscoveredWorktree, Project, ProjectSource, Workspace};
use async_trait::async_trait;
use hydra_hook::MergeResult;
use hydra_runtime::{DispatchError, Operation, OperationContext};
use hydra_types::{Intent, IntentKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Contribution of one `discover` handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    #[serde(default)]
    pub workspaces: Option<Vec<DiscoveredWorktree>>,
}

impl MergeResult for Discovery {
    fn merge(&mut self, later: Self) {
        if later.workspaces.is_some() {
            self.workspaces = later.workspaces;
        }
    }
}

pub struct OpenProjectOperation;

#[async_trait]
impl Operation for OpenProjectOperation {
    fn id(&self) -> &str {
        OpenProject::TYPE
    }

    async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
        let op = OpenProject::TYPE;
        let _source: ProjectSource = ctx.payload()?;
        let mut hook_ctx = ctx.hook_context();

        ctx.run_mandatory("resolve", &mut hook_ctx).await?;
        let path: PathBuf = require(&hook_ctx, op, fields::PROJECT_PATH)?;

        let discovery: Discovery = ctx.collect_mandatory("discover", &mut hook_ctx).await?;
        let discovered = discovery.workspaces.unwrap_or_default();

        ctx.run_mandatory("register", &mut hook_ctx).await?;

        let intents = discovered
            .iter()
            .map(|w| {
                Intent::of::<CreateWorkspace>(&CreateWorkspaceRequest {
                    project_path: path.clone(),
                    name: w.name.clone(),
                    branch: w.branch.clone(),
                    path: Some(w.path.clone()),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DispatchError::InvalidPayload {
                intent: CreateWorkspace::TYPE.to_string(),
                message: e.to_string(),
            })?;
        let report = ctx.fan_out(intents).await;
        if !report.is_clean() {
            tracing::info!(
                project = %path.display(),
                discovered = report.attempted,
                failed = report.failures.len(),
                "some discovered workspaces could not be opened"
            );
        }

        let project = Project {
            name: optional(&hook_ctx, fields::PROJECT_NAME)
                .unwrap_or_else(|| Project::name_for(&path)),
            remote_url: optional(&hook_ctx, fields::REMOTE_URL),
            workspaces: discovered
                .into_iter()
                .map(|w| Workspace {
                    name: w.name,
                    path: w.path,
                    project_path: path.clone(),
                    branch: w.branch,
                    editor_url: None,
                })
                .collect(),
            path,
        };

        ctx.emit_as::<ProjectOpened>(&ProjectOpenedEvent {
            project: project.clone(),
        })?;
        encode(op, &project)
    }
}
