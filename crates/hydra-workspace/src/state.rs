//! In-memory application state owned by the `app_state` and `ui` modules.
//!
//! The engine does not know this exists. Handlers reach it through the
//! `Arc` their module was built with, and every method takes the lock
//! for a single step, never across an `.await`.

use crate::normalize::same_path;
use crate::types::{Project, UiMode, Workspace};
use crate::WorkspaceError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct Inner {
    projects: Vec<Project>,
    active: Option<PathBuf>,
}

/// Open projects and the active workspace.
#[derive(Debug, Default)]
pub struct AppState {
    inner: RwLock<Inner>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `project`, or refreshes an already open one in place while
    /// keeping its known workspaces. Returns `true` if it was new.
    pub fn add_project(&self, project: Project) -> bool {
        let mut inner = self.inner.write();
        match inner
            .projects
            .iter_mut()
            .find(|p| same_path(&p.path, &project.path))
        {
            Some(existing) => {
                existing.name = project.name;
                if project.remote_url.is_some() {
                    existing.remote_url = project.remote_url;
                }
                false
            }
            None => {
                inner.projects.push(project);
                true
            }
        }
    }

    /// Removes a project. Clears the active workspace if it belonged to it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UnknownProject`] if it is not open.
    pub fn remove_project(&self, path: &Path) -> Result<Project, WorkspaceError> {
        let mut inner = self.inner.write();
        let index = inner
            .projects
            .iter()
            .position(|p| same_path(&p.path, path))
            .ok_or_else(|| WorkspaceError::UnknownProject(path.display().to_string()))?;
        let project = inner.projects.remove(index);

        let active_in_project = inner
            .active
            .as_deref()
            .is_some_and(|a| project.workspaces.iter().any(|w| same_path(&w.path, a)));
        if active_in_project {
            inner.active = None;
        }
        Ok(project)
    }

    #[must_use]
    pub fn project(&self, path: &Path) -> Option<Project> {
        self.inner
            .read()
            .projects
            .iter()
            .find(|p| same_path(&p.path, path))
            .cloned()
    }

    /// Open projects in the order they were opened.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.inner.read().projects.clone()
    }

    #[must_use]
    pub fn is_open(&self, path: &Path) -> bool {
        self.project(path).is_some()
    }

    /// Adds `workspace` to its project, replacing one at the same path.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UnknownProject`] if the project is not open.
    pub fn add_workspace(&self, workspace: Workspace) -> Result<(), WorkspaceError> {
        let mut inner = self.inner.write();
        let project = inner
            .projects
            .iter_mut()
            .find(|p| same_path(&p.path, &workspace.project_path))
            .ok_or_else(|| {
                WorkspaceError::UnknownProject(workspace.project_path.display().to_string())
            })?;

        match project
            .workspaces
            .iter_mut()
            .find(|w| same_path(&w.path, &workspace.path))
        {
            Some(existing) => *existing = workspace,
            None => project.workspaces.push(workspace),
        }
        Ok(())
    }

    #[must_use]
    pub fn workspace(&self, path: &Path) -> Option<Workspace> {
        self.inner
            .read()
            .projects
            .iter()
            .flat_map(|p| p.workspaces.iter())
            .find(|w| same_path(&w.path, path))
            .cloned()
    }

    /// Makes the workspace at `path` active and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UnknownWorkspace`] if no open project has
    /// a workspace at `path`.
    pub fn activate(&self, path: &Path) -> Result<(Workspace, Option<PathBuf>), WorkspaceError> {
        let mut inner = self.inner.write();
        let workspace = inner
            .projects
            .iter()
            .flat_map(|p| p.workspaces.iter())
            .find(|w| same_path(&w.path, path))
            .cloned()
            .ok_or_else(|| WorkspaceError::UnknownWorkspace(path.display().to_string()))?;
        let previous = inner.active.replace(workspace.path.clone());
        Ok((workspace, previous))
    }

    #[must_use]
    pub fn active(&self) -> Option<PathBuf> {
        self.inner.read().active.clone()
    }
}

/// Current UI mode.
#[derive(Debug, Default)]
pub struct UiState {
    mode: RwLock<UiMode>,
}

impl UiState {
    #[must_use]
    pub fn new(initial: UiMode) -> Self {
        Self {
            mode: RwLock::new(initial),
        }
    }

    #[must_use]
    pub fn mode(&self) -> UiMode {
        *self.mode.read()
    }

    /// Sets the mode and returns the previous one, even when unchanged.
    pub fn set(&self, mode: UiMode) -> UiMode {
        std::mem::replace(&mut *self.mode.write(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(path: &str) -> Project {
        Project {
            path: path.into(),
            name: "repo".into(),
            remote_url: None,
            workspaces: Vec::new(),
        }
    }

    fn workspace(project: &str, path: &str) -> Workspace {
        Workspace {
            name: "feat".into(),
            path: path.into(),
            project_path: project.into(),
            branch: None,
            editor_url: None,
        }
    }

    #[test]
    fn reopening_keeps_workspaces() {
        let state = AppState::new();
        assert!(state.add_project(project("/repo")));
        state
            .add_workspace(workspace("/repo", "/wt/feat"))
            .expect("project is open");

        assert!(!state.add_project(project("/repo/")));
        assert_eq!(state.projects().len(), 1);
        assert_eq!(
            state.project(Path::new("/repo")).map(|p| p.workspaces.len()),
            Some(1)
        );
    }

    #[test]
    fn workspace_requires_open_project() {
        let state = AppState::new();
        let err = state
            .add_workspace(workspace("/missing", "/wt/x"))
            .expect_err("unknown project");
        assert_eq!(err, WorkspaceError::UnknownProject("/missing".into()));
    }

    #[test]
    fn activate_returns_previous() {
        let state = AppState::new();
        state.add_project(project("/repo"));
        state.add_workspace(workspace("/repo", "/wt/a")).expect("add");
        state.add_workspace(workspace("/repo", "/wt/b")).expect("add");

        let (_, prev) = state.activate(Path::new("/wt/a")).expect("a");
        assert!(prev.is_none());
        let (ws, prev) = state.activate(Path::new("/wt/b")).expect("b");
        assert_eq!(ws.path, PathBuf::from("/wt/b"));
        assert_eq!(prev, Some(PathBuf::from("/wt/a")));
    }

    #[test]
    fn removing_project_clears_its_active_workspace() {
        let state = AppState::new();
        state.add_project(project("/repo"));
        state.add_workspace(workspace("/repo", "/wt/a")).expect("add");
        state.activate(Path::new("/wt/a")).expect("activate");

        let removed = state.remove_project(Path::new("/repo")).expect("open");
        assert_eq!(removed.workspaces.len(), 1);
        assert!(state.active().is_none());
        assert!(state.remove_project(Path::new("/repo")).is_err());
    }

    #[test]
    fn ui_set_returns_previous_even_when_unchanged() {
        let ui = UiState::new(UiMode::Workspace);
        assert_eq!(ui.set(UiMode::Shortcut), UiMode::Workspace);
        assert_eq!(ui.set(UiMode::Shortcut), UiMode::Shortcut);
        assert_eq!(ui.mode(), UiMode::Shortcut);
    }
}
