//! Contracts for the external services handlers call into.
//!
//! The engine never touches git, the filesystem beyond path checks, the
//! editor server or the window layer directly. Each is reached through
//! one of these traits, so tests substitute recording fakes and the
//! binary substitutes process-backed implementations.

use crate::types::DiscoveredWorktree;
use crate::WorkspaceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Lists and creates git worktrees.
#[async_trait]
pub trait WorktreeProvider: Send + Sync {
    /// Worktrees of `project`, excluding the main checkout.
    async fn list_worktrees(&self, project: &Path)
        -> Result<Vec<DiscoveredWorktree>, WorkspaceError>;

    /// Creates a worktree for `branch` (or a new branch named `name`) at
    /// `target`.
    async fn create_worktree(
        &self,
        project: &Path,
        name: &str,
        branch: Option<&str>,
        target: &Path,
    ) -> Result<DiscoveredWorktree, WorkspaceError>;
}

/// Clones a remote repository.
#[async_trait]
pub trait RepositoryCloner: Send + Sync {
    /// Clones `url` into `dest`. `dest` does not exist beforehand.
    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<(), WorkspaceError>;
}

/// Starts and stops the editor server of a workspace.
#[async_trait]
pub trait EditorLauncher: Send + Sync {
    /// Starts a server for `workspace` and returns the URL it serves on.
    async fn start(&self, workspace: &Path) -> Result<String, WorkspaceError>;

    /// Stops the server for `workspace`. Returns `false` if none ran.
    async fn stop(&self, workspace: &Path) -> Result<bool, WorkspaceError>;
}

/// Copies the files a project lists in its keepfiles into a workspace.
#[async_trait]
pub trait FileCopier: Send + Sync {
    /// Copies every entry of `<project>/<keepfiles>` into `workspace`.
    /// Returns the copied paths, relative to the project.
    async fn copy_keepfiles(
        &self,
        project: &Path,
        workspace: &Path,
        keepfiles: &str,
    ) -> Result<Vec<PathBuf>, WorkspaceError>;
}

/// Shows a workspace's view.
#[async_trait]
pub trait ViewManager: Send + Sync {
    async fn activate(&self, workspace: &Path) -> Result<(), WorkspaceError>;
}
