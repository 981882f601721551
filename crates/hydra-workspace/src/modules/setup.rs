//! Prepares a fresh workspace: copies keepfiles, then starts its editor.
//!
//! Both steps run even if the first fails; the handler reports the first
//! failure afterwards. The point is best-effort, so neither blocks the
//! workspace from being registered.

use crate::collaborators::{EditorLauncher, FileCopier};
use crate::intents::{CreateWorkspace, CreateWorkspaceRequest};
use crate::operations::fields;
use crate::WorkspaceError;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::path::PathBuf;
use std::sync::Arc;

pub const MODULE_NAME: &str = "setup";

pub struct WorkspaceSetup {
    copier: Arc<dyn FileCopier>,
    editor: Arc<dyn EditorLauncher>,
    keepfiles_file: String,
}

impl WorkspaceSetup {
    pub fn new(
        copier: Arc<dyn FileCopier>,
        editor: Arc<dyn EditorLauncher>,
        keepfiles_file: impl Into<String>,
    ) -> Self {
        Self {
            copier,
            editor,
            keepfiles_file: keepfiles_file.into(),
        }
    }
}

#[async_trait]
impl HookHandler for WorkspaceSetup {
    fn id(&self) -> &str {
        "setup.prepare"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let Some(workspace) = ctx.get::<PathBuf>(fields::WORKSPACE_PATH)? else {
            return Ok(None);
        };
        let request: CreateWorkspaceRequest = ctx.intent().payload_as()?;
        let adopted = ctx.get::<bool>(fields::ADOPTED)?.unwrap_or(false);

        let mut first_error: Option<WorkspaceError> = None;

        // Adopted worktrees were set up when they were first created.
        if !adopted {
            match self
                .copier
                .copy_keepfiles(&request.project_path, &workspace, &self.keepfiles_file)
                .await
            {
                Ok(copied) => {
                    tracing::debug!(
                        workspace = %workspace.display(),
                        copied = copied.len(),
                        "copied keepfiles"
                    );
                }
                Err(e) => first_error = Some(e),
            }
        }

        match self.editor.start(&workspace).await {
            Ok(url) => ctx.set(fields::EDITOR_URL, &url)?,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(None),
        }
    }
}

#[must_use]
pub fn module(
    copier: Arc<dyn FileCopier>,
    editor: Arc<dyn EditorLauncher>,
    keepfiles_file: String,
) -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(
        CreateWorkspace::TYPE,
        "setup",
        Arc::new(WorkspaceSetup::new(copier, editor, keepfiles_file)),
    )
}
