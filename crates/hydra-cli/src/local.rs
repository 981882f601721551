//! Filesystem and headless collaborators for running without a UI.

use async_trait::async_trait;
use hydra_workspace::{EditorLauncher, FileCopier, ViewManager, WorkspaceError};
use std::path::{Component, Path, PathBuf};

/// Copies the entries listed in a project's keepfiles into a workspace.
///
/// The list holds one project-relative path per line. Blank lines and
/// `#` comments are ignored, as are absolute paths and paths leaving the
/// project. Directories are copied recursively; missing entries are
/// skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepfilesCopier;

/// Entries of a keepfiles list that are safe to copy.
fn parse_keepfiles(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .filter(|path| {
            let inside = path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
            if !inside {
                tracing::warn!(
                    entry = %path.display(),
                    "ignoring keepfiles entry outside the project"
                );
            }
            inside
        })
        .collect()
}

/// Copies a file or directory tree. Symlinks are recreated as links and
/// never followed, so a link cycle cannot recurse.
async fn copy_entry(from: &Path, to: &Path) -> Result<(), WorkspaceError> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src, dst)) = pending.pop() {
        let meta = tokio::fs::symlink_metadata(&src)
            .await
            .map_err(|e| WorkspaceError::io(&src, &e))?;

        if meta.file_type().is_symlink() {
            copy_link(&src, &dst).await?;
        } else if meta.is_dir() {
            tokio::fs::create_dir_all(&dst)
                .await
                .map_err(|e| WorkspaceError::io(&dst, &e))?;
            let mut entries = tokio::fs::read_dir(&src)
                .await
                .map_err(|e| WorkspaceError::io(&src, &e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| WorkspaceError::io(&src, &e))?
            {
                pending.push((entry.path(), dst.join(entry.file_name())));
            }
        } else {
            if let Some(parent) = dst.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| WorkspaceError::io(parent, &e))?;
            }
            tokio::fs::copy(&src, &dst)
                .await
                .map_err(|e| WorkspaceError::io(&src, &e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn copy_link(src: &Path, dst: &Path) -> Result<(), WorkspaceError> {
    let target = tokio::fs::read_link(src)
        .await
        .map_err(|e| WorkspaceError::io(src, &e))?;
    if let Some(parent) = dst.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| WorkspaceError::io(parent, &e))?;
    }
    match tokio::fs::remove_file(dst).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            return Err(WorkspaceError::io(dst, &e));
        }
        _ => {}
    }
    tokio::fs::symlink(&target, dst)
        .await
        .map_err(|e| WorkspaceError::io(dst, &e))
}

#[cfg(not(unix))]
async fn copy_link(src: &Path, dst: &Path) -> Result<(), WorkspaceError> {
    tracing::debug!(link = %src.display(), dst = %dst.display(), "symlink not copied");
    Ok(())
}

#[async_trait]
impl FileCopier for KeepfilesCopier {
    async fn copy_keepfiles(
        &self,
        project: &Path,
        workspace: &Path,
        keepfiles: &str,
    ) -> Result<Vec<PathBuf>, WorkspaceError> {
        let list = project.join(keepfiles);
        let content = match tokio::fs::read_to_string(&list).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(WorkspaceError::io(&list, &e)),
        };

        let mut copied = Vec::new();
        for entry in parse_keepfiles(&content) {
            let src = project.join(&entry);
            let exists = tokio::fs::try_exists(&src)
                .await
                .map_err(|e| WorkspaceError::io(&src, &e))?;
            if !exists {
                tracing::debug!(entry = %entry.display(), "keepfiles entry missing, skipped");
                continue;
            }
            copy_entry(&src, &workspace.join(&entry)).await?;
            copied.push(entry);
        }
        Ok(copied)
    }
}

/// Editor launcher for headless use: the "URL" is the workspace folder.
#[derive(Debug, Default, Clone, Copy)]
pub struct FolderEditor;

#[async_trait]
impl EditorLauncher for FolderEditor {
    async fn start(&self, workspace: &Path) -> Result<String, WorkspaceError> {
        Ok(format!("file://{}", workspace.display()))
    }

    async fn stop(&self, _workspace: &Path) -> Result<bool, WorkspaceError> {
        Ok(false)
    }
}

/// View manager that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogView;

#[async_trait]
impl ViewManager for LogView {
    async fn activate(&self, workspace: &Path) -> Result<(), WorkspaceError> {
        tracing::info!(workspace = %workspace.display(), "workspace active");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keepfiles_skip_comments_and_escapes() {
        let entries = parse_keepfiles("# secrets\n.env\n\n  config/local.toml \n../up\n/etc/passwd\n");
        assert_eq!(
            entries,
            vec![PathBuf::from(".env"), PathBuf::from("config/local.toml")]
        );
    }

    #[tokio::test]
    async fn copies_files_and_directories() {
        let project = tempfile::tempdir().expect("project");
        let workspace = tempfile::tempdir().expect("workspace");
        std::fs::write(project.path().join(".keepfiles"), ".env\nsecrets\nmissing\n")
            .expect("write list");
        std::fs::write(project.path().join(".env"), "TOKEN=1").expect("write env");
        std::fs::create_dir_all(project.path().join("secrets/nested")).expect("mkdir");
        std::fs::write(project.path().join("secrets/nested/key"), "k").expect("write key");

        let copied = KeepfilesCopier
            .copy_keepfiles(project.path(), workspace.path(), ".keepfiles")
            .await
            .expect("copy");

        assert_eq!(copied, vec![PathBuf::from(".env"), PathBuf::from("secrets")]);
        assert_eq!(
            std::fs::read_to_string(workspace.path().join(".env")).expect("read"),
            "TOKEN=1"
        );
        assert!(workspace.path().join("secrets/nested/key").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_cycle_is_copied_as_a_link() {
        let project = tempfile::tempdir().expect("project");
        let workspace = tempfile::tempdir().expect("workspace");
        std::fs::write(project.path().join(".keepfiles"), "shared\n").expect("write list");
        let shared = project.path().join("shared");
        std::fs::create_dir_all(&shared).expect("mkdir");
        std::fs::write(shared.join("a.txt"), "a").expect("write file");
        std::os::unix::fs::symlink("..", shared.join("up")).expect("symlink");

        let copied = KeepfilesCopier
            .copy_keepfiles(project.path(), workspace.path(), ".keepfiles")
            .await
            .expect("copy terminates");

        assert_eq!(copied, vec![PathBuf::from("shared")]);
        let link = workspace.path().join("shared/up");
        assert!(std::fs::symlink_metadata(&link)
            .expect("link copied")
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read_link(&link).expect("read link"), PathBuf::from(".."));
        assert!(workspace.path().join("shared/a.txt").is_file());
    }

    #[tokio::test]
    async fn missing_list_copies_nothing() {
        let project = tempfile::tempdir().expect("project");
        let workspace = tempfile::tempdir().expect("workspace");

        let copied = KeepfilesCopier
            .copy_keepfiles(project.path(), workspace.path(), ".keepfiles")
            .await
            .expect("no list is fine");
        assert!(copied.is_empty());
    }
}
