//! Plugin modules contributing the handlers of the workspace Operations.
//!
//! | Module | Contributes |
//! |--------|-------------|
//! | `local_source` | `project:open/resolve` for local paths |
//! | `remote_source` | `project:open/resolve` for URLs, plus the `project:open` guard |
//! | `discovery` | `project:open/discover` |
//! | `worktree` | `workspace:create/create` |
//! | `setup` | `workspace:create/setup` |
//! | `app_state` | `register`, `unregister` and `workspace:switch/resolve` |
//! | `editor` | `project:close/teardown` |
//! | `view` | `workspace:switch/activate` |
//! | `ui` | `ui:set-mode/apply` |
//!
//! Each module is a plain function returning an [`IntentModule`]; the
//! handlers hold `Arc`s to the collaborators and state they need.

pub mod app_state;
pub mod discovery;
pub mod editor;
pub mod local_source;
pub mod remote_source;
pub mod setup;
pub mod ui;
pub mod view;
pub mod worktree;

use crate::collaborators::{
    EditorLauncher, FileCopier, RepositoryCloner, ViewManager, WorktreeProvider,
};
use crate::state::{AppState, UiState};
use hydra_runtime::config::WorkspaceConfig;
use hydra_runtime::IntentModule;
use std::path::PathBuf;
use std::sync::Arc;

/// Filesystem locations the handlers work in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    /// Root under which new worktrees are created, one directory per project.
    pub worktrees_dir: PathBuf,
    /// Where remote projects are cloned.
    pub projects_dir: PathBuf,
    /// Name of the keepfiles list inside a project.
    pub keepfiles_file: String,
}

impl WorkspaceSettings {
    /// Settings from the `[workspace]` config section.
    #[must_use]
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            worktrees_dir: config.worktrees_dir_or_default(),
            projects_dir: config.projects_dir_or_default(),
            keepfiles_file: config.keepfiles_file.clone(),
        }
    }
}

/// Everything the default modules are built from.
#[derive(Clone)]
pub struct Services {
    pub settings: WorkspaceSettings,
    pub app_state: Arc<AppState>,
    pub ui_state: Arc<UiState>,
    pub worktrees: Arc<dyn WorktreeProvider>,
    pub cloner: Arc<dyn RepositoryCloner>,
    pub editor: Arc<dyn EditorLauncher>,
    pub copier: Arc<dyn FileCopier>,
    pub view: Arc<dyn ViewManager>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("settings", &self.settings)
            .field("projects", &self.app_state.projects().len())
            .field("mode", &self.ui_state.mode())
            .finish_non_exhaustive()
    }
}

/// The full module set, in wiring order.
///
/// Order matters only within a point: `local_source` and `remote_source`
/// both sit on `project:open/resolve` and self-select on the source kind.
#[must_use]
pub fn default_modules(services: &Services) -> Vec<IntentModule> {
    vec![
        local_source::module(),
        remote_source::module(
            services.cloner.clone(),
            services.settings.projects_dir.clone(),
            services.app_state.clone(),
        ),
        discovery::module(services.worktrees.clone()),
        worktree::module(
            services.worktrees.clone(),
            services.app_state.clone(),
            services.settings.worktrees_dir.clone(),
        ),
        setup::module(
            services.copier.clone(),
            services.editor.clone(),
            services.settings.keepfiles_file.clone(),
        ),
        app_state::module(services.app_state.clone()),
        editor::module(services.editor.clone(), services.app_state.clone()),
        view::module(services.view.clone()),
        ui::module(services.ui_state.clone()),
    ]
}
