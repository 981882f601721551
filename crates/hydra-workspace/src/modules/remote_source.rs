//! Resolves `{ kind: "remote", url }` sources by cloning into the
//! projects directory, and guards `project:open` against running twice
//! for the same project.

use crate::collaborators::RepositoryCloner;
use crate::intents::{OpenProject, ProjectOpened};
use crate::normalize::{canonical_key, normalize_url, path_key, repo_name, same_path};
use crate::operations::fields;
use crate::state::AppState;
use crate::types::ProjectSource;
use crate::WorkspaceError;
use async_trait::async_trait;
use hydra_hook::{HandlerResult, HookContext, HookHandler};
use hydra_runtime::{IdempotencyGuard, IntentModule};
use hydra_types::{DomainEvent, EventKind, Intent, IntentKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const MODULE_NAME: &str = "remote_source";

/// ID of the `project:open` idempotency guard.
pub const GUARD_ID: &str = "remote_source.open-guard";

pub struct RemoteSourceResolver {
    cloner: Arc<dyn RepositoryCloner>,
    projects_dir: PathBuf,
}

impl RemoteSourceResolver {
    pub fn new(cloner: Arc<dyn RepositoryCloner>, projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            cloner,
            projects_dir: projects_dir.into(),
        }
    }
}

#[async_trait]
impl HookHandler for RemoteSourceResolver {
    fn id(&self) -> &str {
        "remote_source.resolve"
    }

    async fn handle(&self, ctx: &mut HookContext) -> HandlerResult {
        let Ok(ProjectSource::Remote { url }) = ctx.intent().payload_as::<ProjectSource>() else {
            return Ok(None);
        };

        let name = repo_name(&url)?;
        let dest = self.projects_dir.join(&name);
        let exists = tokio::fs::try_exists(&dest)
            .await
            .map_err(|e| WorkspaceError::io(&dest, &e))?;

        if exists {
            tracing::debug!(url = %url, dest = %dest.display(), "reusing existing clone");
        } else {
            tokio::fs::create_dir_all(&self.projects_dir)
                .await
                .map_err(|e| WorkspaceError::io(&self.projects_dir, &e))?;
            tracing::info!(url = %url, dest = %dest.display(), "cloning remote project");
            self.cloner.clone_repository(&url, &dest).await?;
        }

        ctx.set(fields::PROJECT_NAME, &name)?;
        ctx.set(fields::REMOTE_URL, &url)?;
        ctx.set(fields::PROJECT_PATH, &dest)?;
        Ok(None)
    }
}

/// Idempotency key of a `project:open` intent.
///
/// Local sources key on the canonical path, so a symlink or a relative
/// spelling of an open project maps to the path it was recorded under.
/// Remote ones key on the normalized URL. Malformed payloads are not
/// guarded.
#[must_use]
pub fn source_key(intent: &Intent) -> Option<String> {
    match intent.payload_as::<ProjectSource>().ok()? {
        ProjectSource::Local { path } => Some(canonical_key(&path)),
        ProjectSource::Remote { url } => normalize_url(&url).ok(),
    }
}

/// Key of a `project:opened` event, matching [`source_key`].
fn opened_key(event: &DomainEvent) -> Option<String> {
    let opened = event.decode::<ProjectOpened>().ok()?;
    match opened.project.remote_url {
        Some(url) => normalize_url(&url).ok(),
        None => Some(path_key(&opened.project.path)),
    }
}

/// Returns `true` if `key` names a project that is already open.
fn is_open(state: &AppState, key: &str) -> bool {
    state.projects().iter().any(|p| match &p.remote_url {
        Some(url) if normalize_url(url).is_ok_and(|n| n == key) => true,
        _ => same_path(&p.path, Path::new(key)),
    })
}

/// Builds the guard that cancels `project:open` while the same project
/// is being opened, or once it is open.
#[must_use]
pub fn open_guard(state: Arc<AppState>) -> IdempotencyGuard {
    IdempotencyGuard::builder(GUARD_ID, OpenProject::TYPE, source_key)
        .already_done(move |key: &str| is_open(&state, key))
        .released_by(ProjectOpened::TYPE, opened_key)
        .build()
}

#[must_use]
pub fn module(
    cloner: Arc<dyn RepositoryCloner>,
    projects_dir: PathBuf,
    state: Arc<AppState>,
) -> IntentModule {
    let guard = open_guard(state);
    IntentModule::new(MODULE_NAME)
        .hook(
            OpenProject::TYPE,
            "resolve",
            Arc::new(RemoteSourceResolver::new(cloner, projects_dir)),
        )
        .interceptor(Arc::new(guard.clone()))
        .on_event(ProjectOpened::TYPE, Arc::new(guard))
}
