//! Resolves `{ kind: "local", path }` sources to a canonical directory.

use crate::intents::OpenProject;
use crate::operations::fields;
use crate::types::{Project, ProjectSource};
use crate::WorkspaceError;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::io::ErrorKind;
use std::sync::Arc;

pub const MODULE_NAME: &str = "local_source";

pub struct LocalSourceResolver;

#[async_trait]
impl HookHandler for LocalSourceResolver {
    fn id(&self) -> &str {
        "local_source.resolve"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let Ok(ProjectSource::Local { path }) = ctx.intent().payload_as::<ProjectSource>() else {
            return Ok(None);
        };

        let canonical = tokio::fs::canonicalize(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => WorkspaceError::PathNotFound(path.clone()),
            _ => WorkspaceError::io(&path, &e),
        })?;
        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| WorkspaceError::io(&canonical, &e))?;
        if !metadata.is_dir() {
            return Err(WorkspaceError::NotADirectory(canonical).into());
        }

        tracing::debug!(path = %canonical.display(), "resolved local project");
        ctx.set(fields::PROJECT_NAME, &Project::name_for(&canonical))?;
        ctx.set(fields::PROJECT_PATH, &canonical)?;
        Ok(None)
    }
}

#[must_use]
pub fn module() -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(
        OpenProject::TYPE,
        "resolve",
        Arc::new(LocalSourceResolver),
    )
}
