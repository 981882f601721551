//! Domain values carried in payloads, results and events.
//!
//! Everything here serializes as camelCase JSON, the shape UI callers
//! see on the wire.

use crate::WorkspaceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// An open project: a git repository with zero or more worktrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub path: PathBuf,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

impl Project {
    /// Display name derived from the last path component.
    #[must_use]
    pub fn name_for(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// A worktree of a project, optionally served by an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub name: String,
    pub path: PathBuf,
    pub project_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_url: Option<String>,
}

/// Where a project comes from. Resolver handlers select on `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProjectSource {
    Local { path: PathBuf },
    Remote { url: String },
}

/// A worktree found on disk by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredWorktree {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Which surface has keyboard focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Workspace,
    Shortcut,
    Dialog,
}

impl UiMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Shortcut => "shortcut",
            Self::Dialog => "dialog",
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiMode {
    type Err = WorkspaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workspace" => Ok(Self::Workspace),
            "shortcut" => Ok(Self::Shortcut),
            "dialog" => Ok(Self::Dialog),
            other => Err(WorkspaceError::InvalidMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_is_tagged_by_kind() {
        let local: ProjectSource =
            serde_json::from_value(json!({"kind": "local", "path": "/repo"})).expect("local");
        assert_eq!(
            local,
            ProjectSource::Local {
                path: "/repo".into()
            }
        );

        let remote = serde_json::to_value(ProjectSource::Remote {
            url: "https://example.com/a/b.git".into(),
        })
        .expect("encode");
        assert_eq!(
            remote,
            json!({"kind": "remote", "url": "https://example.com/a/b.git"})
        );
    }

    #[test]
    fn source_without_kind_is_rejected() {
        let res = serde_json::from_value::<ProjectSource>(json!({"path": "/repo"}));
        assert!(res.is_err());
    }

    #[test]
    fn workspace_serializes_camel_case() {
        let ws = Workspace {
            name: "feature".into(),
            path: "/wt/feature".into(),
            project_path: "/repo".into(),
            branch: Some("feature".into()),
            editor_url: None,
        };
        let v = serde_json::to_value(&ws).expect("encode");
        assert_eq!(v["projectPath"], "/repo");
        assert!(v.get("editorUrl").is_none());
    }

    #[test]
    fn project_name_from_path() {
        assert_eq!(Project::name_for(Path::new("/src/widget")), "widget");
        assert_eq!(Project::name_for(Path::new("/")), "/");
    }

    #[test]
    fn ui_mode_parses() {
        assert_eq!("shortcut".parse::<UiMode>(), Ok(UiMode::Shortcut));
        assert!("fullscreen".parse::<UiMode>().is_err());
        assert_eq!(UiMode::default().to_string(), "workspace");
    }
}
