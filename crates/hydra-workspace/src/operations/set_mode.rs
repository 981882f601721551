//! `ui:set-mode`
//!
//! ```text
//! apply (run, mandatory) ─► previousMode
//! emit ui:mode-changed   (also when the mode did not change)
//! ```

use super::{encode, fields, require};
use crate::intents::{ModeChange, ModeChanged, SetMode, SetModeRequest};
use crate::types::UiMode;
use async_trait::async_trait;
use hydra_runtime::{DispatchError, Operation, OperationContext};
use hydra_types::IntentKind;
use serde_json::Value;

pub struct SetModeOperation;

#[async_trait]
impl Operation for SetModeOperation {
    fn id(&self) -> &str {
        SetMode::TYPE
    }

    async fn execute(&self, ctx: OperationContext<'_>) -> Result<Value, DispatchError> {
        let op = SetMode::TYPE;
        let request: SetModeRequest = ctx.payload()?;
        let mut hook_ctx = ctx.hook_context();

        ctx.run_mandatory("apply", &mut hook_ctx).await?;
        let previous_mode: UiMode = require(&hook_ctx, op, fields::PREVIOUS_MODE)?;

        let change = ModeChange {
            mode: request.mode,
            previous_mode,
        };
        ctx.emit_as::<ModeChanged>(&change)?;
        encode(op, &change)
    }
}
