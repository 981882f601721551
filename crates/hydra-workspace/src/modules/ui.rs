//! Applies `ui:set-mode` to [`UiState`].

use crate::intents::{SetMode, SetModeRequest};
use crate::operations::fields;
use crate::state::UiState;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::sync::Arc;

pub const MODULE_NAME: &str = "ui";

pub struct ApplyMode(Arc<UiState>);

#[async_trait]
impl HookHandler for ApplyMode {
    fn id(&self) -> &str {
        "ui.apply"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let request: SetModeRequest = ctx.intent().payload_as()?;
        let previous = self.0.set(request.mode);
        tracing::debug!(mode = %request.mode, previous = %previous, "ui mode set");
        ctx.set(fields::PREVIOUS_MODE, &previous)?;
        Ok(None)
    }
}

#[must_use]
pub fn module(state: Arc<UiState>) -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(SetMode::TYPE, "apply", Arc::new(ApplyMode(state)))
}
