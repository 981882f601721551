//! `git` subprocess implementations of the worktree and clone contracts.

use async_trait::async_trait;
use hydra_workspace::{DiscoveredWorktree, RepositoryCloner, WorkspaceError, WorktreeProvider};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs `git <args>` in `dir` and returns its stdout.
async fn git<I, S>(
    operation: &str,
    dir: Option<&Path>,
    args: I,
) -> Result<String, WorkspaceError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new("git");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args).kill_on_drop(true);

    tracing::debug!(operation, "running git");
    let output = cmd
        .output()
        .await
        .map_err(|e| WorkspaceError::git(operation, format!("cannot run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        return Err(WorkspaceError::git(operation, message));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parses `git worktree list --porcelain`, skipping the main checkout at
/// `project` and bare entries.
fn parse_worktrees(porcelain: &str, project: &Path) -> Vec<DiscoveredWorktree> {
    let mut found = Vec::new();

    for block in porcelain.split("\n\n") {
        let mut path: Option<PathBuf> = None;
        let mut branch: Option<String> = None;
        let mut bare = false;

        for line in block.lines() {
            if let Some(p) = line.strip_prefix("worktree ") {
                path = Some(PathBuf::from(p));
            } else if let Some(b) = line.strip_prefix("branch ") {
                branch = Some(b.strip_prefix("refs/heads/").unwrap_or(b).to_string());
            } else if line == "bare" {
                bare = true;
            }
        }

        let Some(path) = path else { continue };
        if bare || hydra_workspace::normalize::same_path(&path, project) {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        found.push(DiscoveredWorktree { name, path, branch });
    }
    found
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GitWorktrees;

#[async_trait]
impl WorktreeProvider for GitWorktrees {
    async fn list_worktrees(
        &self,
        project: &Path,
    ) -> Result<Vec<DiscoveredWorktree>, WorkspaceError> {
        let out = git(
            "worktree list",
            Some(project),
            ["worktree", "list", "--porcelain"],
        )
        .await?;
        Ok(parse_worktrees(&out, project))
    }

    async fn create_worktree(
        &self,
        project: &Path,
        name: &str,
        branch: Option<&str>,
        target: &Path,
    ) -> Result<DiscoveredWorktree, WorkspaceError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkspaceError::io(parent, &e))?;
        }

        let target_arg = target.as_os_str();
        match branch {
            Some(branch) => {
                git(
                    "worktree add",
                    Some(project),
                    [
                        OsStr::new("worktree"),
                        OsStr::new("add"),
                        target_arg,
                        OsStr::new(branch),
                    ],
                )
                .await?;
            }
            None => {
                git(
                    "worktree add",
                    Some(project),
                    [
                        OsStr::new("worktree"),
                        OsStr::new("add"),
                        OsStr::new("-b"),
                        OsStr::new(name),
                        target_arg,
                    ],
                )
                .await?;
            }
        }

        Ok(DiscoveredWorktree {
            name: name.to_string(),
            path: target.to_path_buf(),
            branch: Some(branch.unwrap_or(name).to_string()),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GitCloner;

#[async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<(), WorkspaceError> {
        git("clone", None, [OsStr::new("clone"), OsStr::new(url), dest.as_os_str()])
            .await
            .map(|_| ())
            .map_err(|e| match e {
                WorkspaceError::Git { message, .. } => WorkspaceError::CloneFailed {
                    url: url.to_string(),
                    message,
                },
                other => other,
            })
    }
}
