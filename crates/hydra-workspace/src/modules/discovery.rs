//! Lists the worktrees of a resolved project.

use crate::collaborators::WorktreeProvider;
use crate::intents::OpenProject;
use crate::operations::{fields, Discovery};
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::path::PathBuf;
use std::sync::Arc;

pub const MODULE_NAME: &str = "discovery";

pub struct WorktreeDiscovery {
    provider: Arc<dyn WorktreeProvider>,
}

impl WorktreeDiscovery {
    pub fn new(provider: Arc<dyn WorktreeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl HookHandler for WorktreeDiscovery {
    fn id(&self) -> &str {
        "discovery.discover"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let Some(project) = ctx.get::<PathBuf>(fields::PROJECT_PATH)? else {
            return Ok(None);
        };

        let workspaces = self.provider.list_worktrees(&project).await?;
        tracing::debug!(
            project = %project.display(),
            found = workspaces.len(),
            "discovered worktrees"
        );
        let discovery = Discovery {
            workspaces: Some(workspaces),
        };
        Ok(Some(serde_json::to_value(discovery)?))
    }
}

#[must_use]
pub fn module(provider: Arc<dyn WorktreeProvider>) -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(
        OpenProject::TYPE,
        "discover",
        Arc::new(WorktreeDiscovery::new(provider)),
    )
}
