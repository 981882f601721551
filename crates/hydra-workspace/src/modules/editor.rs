//! Stops the editor servers of a project's workspaces when it closes.

use crate::collaborators::EditorLauncher;
use crate::intents::{CloseProject, CloseProjectRequest};
use crate::operations::Teardown;
use crate::state::AppState;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::sync::Arc;

pub const MODULE_NAME: &str = "editor";

pub struct EditorTeardown {
    editor: Arc<dyn EditorLauncher>,
    state: Arc<AppState>,
}

impl EditorTeardown {
    pub fn new(editor: Arc<dyn EditorLauncher>, state: Arc<AppState>) -> Self {
        Self { editor, state }
    }
}

#[async_trait]
impl HookHandler for EditorTeardown {
    fn id(&self) -> &str {
        "editor.teardown"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let request: CloseProjectRequest = ctx.intent().payload_as()?;
        let Some(project) = self.state.project(&request.path) else {
            return Ok(None);
        };

        let mut stopped = 0;
        for workspace in &project.workspaces {
            match self.editor.stop(&workspace.path).await {
                Ok(true) => stopped += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        workspace = %workspace.path.display(),
                        error = %e,
                        "failed to stop editor"
                    );
                }
            }
        }

        let teardown = Teardown {
            stopped_editors: Some(stopped),
        };
        Ok(Some(serde_json::to_value(teardown)?))
    }
}

#[must_use]
pub fn module(editor: Arc<dyn EditorLauncher>, state: Arc<AppState>) -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(
        CloseProject::TYPE,
        "teardown",
        Arc::new(EditorTeardown::new(editor, state)),
    )
}
