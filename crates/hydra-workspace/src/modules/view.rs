//! Shows the workspace a switch resolved to.

use crate::collaborators::ViewManager;
use crate::intents::SwitchWorkspace;
use crate::operations::fields;
use crate::types::Workspace;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::sync::Arc;

pub const MODULE_NAME: &str = "view";

pub struct ActivateView(Arc<dyn ViewManager>);

#[async_trait]
impl HookHandler for ActivateView {
    fn id(&self) -> &str {
        "view.activate"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let Some(workspace) = ctx.get::<Workspace>(fields::WORKSPACE)? else {
            return Ok(None);
        };
        self.0.activate(&workspace.path).await?;
        Ok(None)
    }
}

#[must_use]
pub fn module(view: Arc<dyn ViewManager>) -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(
        SwitchWorkspace::TYPE,
        "activate",
        Arc::new(ActivateView(view)),
    )
}
