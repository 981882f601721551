//! Provides the worktree behind `workspace:create`.
//!
//! A request carrying `path` adopts that existing worktree (this is how
//! `project:open` re-registers what discovery found); the path must
//! exist. Otherwise a new worktree is created under
//! `<worktrees_dir>/<project name>/<name>`.

use crate::collaborators::WorktreeProvider;
use crate::intents::{CreateWorkspace, CreateWorkspaceRequest};
use crate::operations::fields;
use crate::state::AppState;
use crate::types::Project;
use crate::WorkspaceError;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::IntentModule;
use hydra_types::IntentKind;
use std::path::PathBuf;
use std::sync::Arc;

pub const MODULE_NAME: &str = "worktree";

pub struct WorktreeCreator {
    provider: Arc<dyn WorktreeProvider>,
    state: Arc<AppState>,
    worktrees_dir: PathBuf,
}

impl WorktreeCreator {
    pub fn new(
        provider: Arc<dyn WorktreeProvider>,
        state: Arc<AppState>,
        worktrees_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            state,
            worktrees_dir: worktrees_dir.into(),
        }
    }

    fn target_for(&self, request: &CreateWorkspaceRequest) -> PathBuf {
        let project_name = self
            .state
            .project(&request.project_path)
            .map(|p| p.name)
            .unwrap_or_else(|| Project::name_for(&request.project_path));
        self.worktrees_dir.join(project_name).join(&request.name)
    }
}

#[async_trait]
impl HookHandler for WorktreeCreator {
    fn id(&self) -> &str {
        "worktree.create"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let request: CreateWorkspaceRequest = ctx.intent().payload_as()?;

        if let Some(existing) = &request.path {
            let present = tokio::fs::try_exists(existing)
                .await
                .map_err(|e| WorkspaceError::io(existing, &e))?;
            if !present {
                return Err(WorkspaceError::PathNotFound(existing.clone()).into());
            }
            ctx.set(fields::WORKSPACE_PATH, existing)?;
            ctx.set(fields::ADOPTED, &true)?;
            if let Some(branch) = &request.branch {
                ctx.set(fields::BRANCH, branch)?;
            }
            return Ok(None);
        }

        let target = self.target_for(&request);
        let created = self
            .provider
            .create_worktree(
                &request.project_path,
                &request.name,
                request.branch.as_deref(),
                &target,
            )
            .await?;
        tracing::info!(
            project = %request.project_path.display(),
            workspace = %created.path.display(),
            "created worktree"
        );

        ctx.set(fields::WORKSPACE_PATH, &created.path)?;
        ctx.set(fields::ADOPTED, &false)?;
        if let Some(branch) = created.branch.or(request.branch) {
            ctx.set(fields::BRANCH, &branch)?;
        }
        Ok(None)
    }
}

#[must_use]
pub fn module(
    provider: Arc<dyn WorktreeProvider>,
    state: Arc<AppState>,
    worktrees_dir: PathBuf,
) -> IntentModule {
    IntentModule::new(MODULE_NAME).hook(
        CreateWorkspace::TYPE,
        "create",
        Arc::new(WorktreeCreator::new(provider, state, worktrees_dir)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWorktreeProvider;
    use hydra_types::Intent;
    use std::path::Path;

    fn request(path: Option<&Path>) -> Intent {
        Intent::of::<CreateWorkspace>(&CreateWorkspaceRequest {
            project_path: "/src/widget".into(),
            name: "feature".into(),
            branch: Some("feature".into()),
            path: path.map(Path::to_path_buf),
        })
        .expect("encode")
    }

    #[tokio::test]
    async fn adopts_existing_path_without_provider() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = Arc::new(FakeWorktreeProvider::new());
        let creator = WorktreeCreator::new(provider.clone(), Arc::new(AppState::new()), "/wt");

        let mut ctx = HookContext::new(request(Some(dir.path())));
        creator.handle(&mut ctx).await.expect("adopts");

        assert_eq!(
            ctx.get::<PathBuf>(fields::WORKSPACE_PATH).expect("decodes"),
            Some(dir.path().to_path_buf())
        );
        assert_eq!(ctx.get::<bool>(fields::ADOPTED).expect("decodes"), Some(true));
        assert!(provider.created().is_empty());
    }

    #[tokio::test]
    async fn adopting_a_missing_path_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = Arc::new(FakeWorktreeProvider::new());
        let creator = WorktreeCreator::new(provider, Arc::new(AppState::new()), "/wt");

        let mut ctx = HookContext::new(request(Some(&dir.path().join("gone"))));
        let err = creator.handle(&mut ctx).await.expect_err("missing");
        assert_eq!(err.code.as_deref(), Some("WORKSPACE_PATH_NOT_FOUND"));
    }

    #[tokio::test]
    async fn creates_under_project_directory() {
        let provider = Arc::new(FakeWorktreeProvider::new());
        let creator = WorktreeCreator::new(provider.clone(), Arc::new(AppState::new()), "/wt");

        let mut ctx = HookContext::new(request(None));
        creator.handle(&mut ctx).await.expect("creates");

        let expected = PathBuf::from("/wt/widget/feature");
        assert_eq!(
            ctx.get::<PathBuf>(fields::WORKSPACE_PATH).expect("decodes"),
            Some(expected.clone())
        );
        assert_eq!(provider.created(), vec![expected]);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(FakeWorktreeProvider::new().failing_create("feature"));
        let creator = WorktreeCreator::new(provider, Arc::new(AppState::new()), "/wt");

        let mut ctx = HookContext::new(request(None));
        let err = creator.handle(&mut ctx).await.expect_err("fails");
        assert_eq!(err.code.as_deref(), Some("WORKSPACE_GIT_FAILED"));
        assert!(!ctx.has(fields::WORKSPACE_PATH));
    }
}
