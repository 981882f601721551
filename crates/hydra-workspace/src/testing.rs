//! Recording fakes for the collaborator traits and a fully wired harness.
//!
//! ```ignore
//! let root = tempfile::tempdir()?;
//! let harness = WorkspaceHarness::new(root.path());
//! let project = harness
//!     .engine
//!     .dispatcher
//!     .dispatch_as::<OpenProject>(&ProjectSource::Local { path: repo })
//!     .await?;
//! ```

use crate::collaborators::{
    EditorLauncher, FileCopier, RepositoryCloner, ViewManager, WorktreeProvider,
};
use crate::intents::EVENT_TYPES;
use crate::modules::{default_modules, Services, WorkspaceSettings};
use crate::normalize::same_path;
use crate::operations::register_operations;
use crate::state::{AppState, UiState};
use crate::types::{DiscoveredWorktree, UiMode};
use crate::WorkspaceError;
use async_trait::async_trait;
use hydra_runtime::testing::TestHarness;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ── WorktreeProvider ─────────────────────────────────────────

/// Serves scripted worktree listings and records created worktrees.
#[derive(Default)]
pub struct FakeWorktreeProvider {
    listings: Mutex<Vec<(PathBuf, Vec<DiscoveredWorktree>)>>,
    failing_names: Mutex<HashSet<String>>,
    created: Mutex<Vec<PathBuf>>,
}

impl FakeWorktreeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `list_worktrees(project)` returns `worktrees`.
    #[must_use]
    pub fn with_worktrees(
        self,
        project: impl Into<PathBuf>,
        worktrees: Vec<DiscoveredWorktree>,
    ) -> Self {
        self.set_worktrees(project, worktrees);
        self
    }

    /// `create_worktree` fails for workspaces named `name`.
    #[must_use]
    pub fn failing_create(self, name: &str) -> Self {
        self.failing_names.lock().insert(name.to_string());
        self
    }

    pub fn set_worktrees(&self, project: impl Into<PathBuf>, worktrees: Vec<DiscoveredWorktree>) {
        let project = project.into();
        let mut listings = self.listings.lock();
        listings.retain(|(p, _)| !same_path(p, &project));
        listings.push((project, worktrees));
    }

    /// Targets of every successful `create_worktree`.
    #[must_use]
    pub fn created(&self) -> Vec<PathBuf> {
        self.created.lock().clone()
    }
}

#[async_trait]
impl WorktreeProvider for FakeWorktreeProvider {
    async fn list_worktrees(
        &self,
        project: &Path,
    ) -> Result<Vec<DiscoveredWorktree>, WorkspaceError> {
        Ok(self
            .listings
            .lock()
            .iter()
            .find(|(p, _)| same_path(p, project))
            .map(|(_, w)| w.clone())
            .unwrap_or_default())
    }

    async fn create_worktree(
        &self,
        _project: &Path,
        name: &str,
        branch: Option<&str>,
        target: &Path,
    ) -> Result<DiscoveredWorktree, WorkspaceError> {
        if self.failing_names.lock().contains(name) {
            return Err(WorkspaceError::git("worktree add", format!("cannot create '{name}'")));
        }
        self.created.lock().push(target.to_path_buf());
        Ok(DiscoveredWorktree {
            name: name.to_string(),
            path: target.to_path_buf(),
            branch: Some(branch.unwrap_or(name).to_string()),
        })
    }
}

// ── RepositoryCloner ─────────────────────────────────────────

/// Creates the destination directory instead of cloning.
#[derive(Default)]
pub struct FakeCloner {
    failure: Option<String>,
    cloned: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeCloner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(url, dest)` of every clone.
    #[must_use]
    pub fn cloned(&self) -> Vec<(String, PathBuf)> {
        self.cloned.lock().clone()
    }
}

#[async_trait]
impl RepositoryCloner for FakeCloner {
    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<(), WorkspaceError> {
        if let Some(message) = &self.failure {
            return Err(WorkspaceError::CloneFailed {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| WorkspaceError::io(dest, &e))?;
        self.cloned.lock().push((url.to_string(), dest.to_path_buf()));
        Ok(())
    }
}

// ── EditorLauncher ───────────────────────────────────────────

/// Hands out fake URLs and remembers which servers are running.
#[derive(Default)]
pub struct RecordingEditor {
    failure: Option<String>,
    started: Mutex<Vec<PathBuf>>,
    running: Mutex<HashSet<PathBuf>>,
    stopped: Mutex<Vec<PathBuf>>,
}

impl RecordingEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn started(&self) -> Vec<PathBuf> {
        self.started.lock().clone()
    }

    #[must_use]
    pub fn stopped(&self) -> Vec<PathBuf> {
        self.stopped.lock().clone()
    }
}

#[async_trait]
impl EditorLauncher for RecordingEditor {
    async fn start(&self, workspace: &Path) -> Result<String, WorkspaceError> {
        if let Some(message) = &self.failure {
            return Err(WorkspaceError::Editor(message.clone()));
        }
        let mut started = self.started.lock();
        started.push(workspace.to_path_buf());
        self.running.lock().insert(workspace.to_path_buf());
        Ok(format!("http://127.0.0.1:{}/", 8080 + started.len()))
    }

    async fn stop(&self, workspace: &Path) -> Result<bool, WorkspaceError> {
        if !self.running.lock().remove(workspace) {
            return Ok(false);
        }
        self.stopped.lock().push(workspace.to_path_buf());
        Ok(true)
    }
}

// ── FileCopier ───────────────────────────────────────────────

/// Records the workspaces keepfiles were copied into.
#[derive(Default)]
pub struct RecordingCopier {
    failure: Option<String>,
    copies: Mutex<Vec<PathBuf>>,
}

impl RecordingCopier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn copies(&self) -> Vec<PathBuf> {
        self.copies.lock().clone()
    }
}

#[async_trait]
impl FileCopier for RecordingCopier {
    async fn copy_keepfiles(
        &self,
        _project: &Path,
        workspace: &Path,
        keepfiles: &str,
    ) -> Result<Vec<PathBuf>, WorkspaceError> {
        if let Some(message) = &self.failure {
            return Err(WorkspaceError::Io {
                path: workspace.join(keepfiles),
                message: message.clone(),
            });
        }
        self.copies.lock().push(workspace.to_path_buf());
        Ok(Vec::new())
    }
}

// ── ViewManager ──────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingViewManager {
    failure: Option<String>,
    activated: Mutex<Vec<PathBuf>>,
}

impl RecordingViewManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn activated(&self) -> Vec<PathBuf> {
        self.activated.lock().clone()
    }
}

#[async_trait]
impl ViewManager for RecordingViewManager {
    async fn activate(&self, workspace: &Path) -> Result<(), WorkspaceError> {
        if let Some(message) = &self.failure {
            return Err(WorkspaceError::View(message.clone()));
        }
        self.activated.lock().push(workspace.to_path_buf());
        Ok(())
    }
}

// ── Harness ──────────────────────────────────────────────────

/// The five Operations and the default modules over recording fakes.
///
/// The recorder is subscribed to every workspace event type.
pub struct WorkspaceHarness {
    pub engine: TestHarness,
    pub app_state: Arc<AppState>,
    pub ui_state: Arc<UiState>,
    pub worktrees: Arc<FakeWorktreeProvider>,
    pub cloner: Arc<FakeCloner>,
    pub editor: Arc<RecordingEditor>,
    pub copier: Arc<RecordingCopier>,
    pub view: Arc<RecordingViewManager>,
}

impl WorkspaceHarness {
    /// Harness whose worktrees and clones live under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self::builder(root).build()
    }

    #[must_use]
    pub fn builder(root: &Path) -> WorkspaceHarnessBuilder {
        WorkspaceHarnessBuilder {
            settings: WorkspaceSettings {
                worktrees_dir: root.join("worktrees"),
                projects_dir: root.join("projects"),
                keepfiles_file: ".keepfiles".to_string(),
            },
            worktrees: FakeWorktreeProvider::new(),
            cloner: FakeCloner::new(),
            editor: RecordingEditor::new(),
            copier: RecordingCopier::new(),
            view: RecordingViewManager::new(),
            initial_mode: UiMode::default(),
        }
    }
}

/// Swaps individual fakes before wiring.
pub struct WorkspaceHarnessBuilder {
    settings: WorkspaceSettings,
    worktrees: FakeWorktreeProvider,
    cloner: FakeCloner,
    editor: RecordingEditor,
    copier: RecordingCopier,
    view: RecordingViewManager,
    initial_mode: UiMode,
}

impl WorkspaceHarnessBuilder {
    #[must_use]
    pub fn worktrees(mut self, worktrees: FakeWorktreeProvider) -> Self {
        self.worktrees = worktrees;
        self
    }

    #[must_use]
    pub fn cloner(mut self, cloner: FakeCloner) -> Self {
        self.cloner = cloner;
        self
    }

    #[must_use]
    pub fn editor(mut self, editor: RecordingEditor) -> Self {
        self.editor = editor;
        self
    }

    #[must_use]
    pub fn copier(mut self, copier: RecordingCopier) -> Self {
        self.copier = copier;
        self
    }

    #[must_use]
    pub fn view(mut self, view: RecordingViewManager) -> Self {
        self.view = view;
        self
    }

    #[must_use]
    pub fn initial_mode(mut self, mode: UiMode) -> Self {
        self.initial_mode = mode;
        self
    }

    #[must_use]
    pub fn build(self) -> WorkspaceHarness {
        let harness = WorkspaceHarness {
            engine: TestHarness::new(),
            app_state: Arc::new(AppState::new()),
            ui_state: Arc::new(UiState::new(self.initial_mode)),
            worktrees: Arc::new(self.worktrees),
            cloner: Arc::new(self.cloner),
            editor: Arc::new(self.editor),
            copier: Arc::new(self.copier),
            view: Arc::new(self.view),
        };

        let services = Services {
            settings: self.settings,
            app_state: harness.app_state.clone(),
            ui_state: harness.ui_state.clone(),
            worktrees: harness.worktrees.clone(),
            cloner: harness.cloner.clone(),
            editor: harness.editor.clone(),
            copier: harness.copier.clone(),
            view: harness.view.clone(),
        };

        register_operations(&harness.engine.dispatcher);
        harness.engine.record_all(&EVENT_TYPES);
        harness.engine.wire(default_modules(&services));
        harness
    }
}
