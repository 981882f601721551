//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use crate::dispatcher::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers. Every
/// section is optional in a config file.
///
/// # Example
///
/// ```
/// use hydra_runtime::config::HydraConfig;
///
/// let config = HydraConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.engine.max_dispatch_depth, 8);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HydraConfig {
    /// Enable debug logging.
    pub debug: bool,

    /// Dispatcher settings.
    pub engine: EngineConfig,

    /// Workspace and project locations.
    pub workspace: WorkspaceConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

impl HydraConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Applies every value `layer` sets, whatever it is.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(debug) = layer.debug {
            self.debug = debug;
        }
        if let Some(depth) = layer.engine.max_dispatch_depth {
            self.engine.max_dispatch_depth = depth;
        }

        let ws = &layer.workspace;
        if let Some(ref dir) = ws.worktrees_dir {
            self.workspace.worktrees_dir = Some(dir.clone());
        }
        if let Some(ref dir) = ws.projects_dir {
            self.workspace.projects_dir = Some(dir.clone());
        }
        if let Some(ref file) = ws.keepfiles_file {
            self.workspace.keepfiles_file = file.clone();
        }
        if let Some(ref mode) = ws.initial_mode {
            self.workspace.initial_mode = mode.clone();
        }

        if let Some(ref level) = layer.logging.level {
            self.logging.level = Some(level.clone());
        }
    }
}

/// One config file as written: only the keys it names are `Some`.
///
/// Layers are applied in order with [`HydraConfig::apply`], so a later
/// file can restore a value an earlier one changed.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigLayer {
    pub debug: Option<bool>,
    pub engine: EngineLayer,
    pub workspace: WorkspaceLayer,
    pub logging: LoggingConfig,
}

impl ConfigLayer {
    /// Parses one config file.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or a key has the wrong type.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// `[engine]` keys of a [`ConfigLayer`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineLayer {
    pub max_dispatch_depth: Option<usize>,
}

/// `[workspace]` keys of a [`ConfigLayer`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceLayer {
    pub worktrees_dir: Option<PathBuf>,
    pub projects_dir: Option<PathBuf>,
    pub keepfiles_file: Option<String>,
    pub initial_mode: Option<String>,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest allowed sub-dispatch nesting.
    pub max_dispatch_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Where projects and worktrees live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Parent directory for created worktrees.
    ///
    /// When `None`, defaults to `~/.hydra/worktrees`.
    pub worktrees_dir: Option<PathBuf>,

    /// Clone target for remote projects.
    ///
    /// When `None`, defaults to `~/.hydra/projects`.
    pub projects_dir: Option<PathBuf>,

    /// Name of the file listing paths to copy into new workspaces.
    pub keepfiles_file: String,

    /// UI mode at startup.
    pub initial_mode: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            worktrees_dir: None,
            projects_dir: None,
            keepfiles_file: ".keepfiles".into(),
            initial_mode: "workspace".into(),
        }
    }
}

impl WorkspaceConfig {
    /// Worktree parent directory, falling back to `~/.hydra/worktrees`.
    #[must_use]
    pub fn worktrees_dir_or_default(&self) -> PathBuf {
        self.worktrees_dir
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| super::default_config_dir().join("worktrees"))
    }

    /// Clone directory, falling back to `~/.hydra/projects`.
    #[must_use]
    pub fn projects_dir_or_default(&self) -> PathBuf {
        self.projects_dir
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| super::default_config_dir().join("projects"))
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"hydra_runtime=debug"`.
    pub level: Option<String>,
}

/// Expands `~` to home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = HydraConfig::default();
        assert!(!config.debug);
        assert_eq!(config.engine.max_dispatch_depth, 8);
        assert_eq!(config.workspace.keepfiles_file, ".keepfiles");
        assert_eq!(config.workspace.initial_mode, "workspace");
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn toml_roundtrip() {
        let config = HydraConfig {
            workspace: WorkspaceConfig {
                projects_dir: Some(PathBuf::from("/srv/projects")),
                ..Default::default()
            },
            ..Default::default()
        };
        let toml = config.to_toml().expect("should serialize config to TOML");
        let restored = HydraConfig::from_toml(&toml).expect("should deserialize roundtripped TOML");
        assert_eq!(config, restored);
    }

    #[test]
    fn toml_partial_parse() {
        let toml = r#"
debug = true

[engine]
max_dispatch_depth = 3
"#;
        let config = HydraConfig::from_toml(toml).expect("should parse partial TOML with defaults");
        assert!(config.debug);
        assert_eq!(config.engine.max_dispatch_depth, 3);
        assert_eq!(config.workspace.keepfiles_file, ".keepfiles");
    }

    #[test]
    fn layer_overrides_only_named_keys() {
        let mut config = HydraConfig {
            logging: LoggingConfig {
                level: Some("info".into()),
            },
            ..Default::default()
        };
        let layer = ConfigLayer::from_toml(
            r#"
debug = true

[workspace]
initial_mode = "shortcut"
"#,
        )
        .expect("should parse layer");

        config.apply(&layer);

        assert!(config.debug);
        assert_eq!(config.workspace.initial_mode, "shortcut");
        assert_eq!(config.engine.max_dispatch_depth, 8);
        assert_eq!(config.logging.level.as_deref(), Some("info"));
    }

    #[test]
    fn layer_can_restore_default_values() {
        let mut config = HydraConfig {
            debug: true,
            engine: EngineConfig {
                max_dispatch_depth: 4,
            },
            workspace: WorkspaceConfig {
                initial_mode: "dialog".into(),
                keepfiles_file: ".copyme".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let layer = ConfigLayer::from_toml(
            r#"
debug = false

[engine]
max_dispatch_depth = 8

[workspace]
initial_mode = "workspace"
keepfiles_file = ".keepfiles"
"#,
        )
        .expect("should parse layer");

        config.apply(&layer);

        assert_eq!(config, HydraConfig::default());
    }

    #[test]
    fn empty_layer_changes_nothing() {
        let mut config = HydraConfig {
            debug: true,
            ..Default::default()
        };
        let before = config.clone();

        config.apply(&ConfigLayer::from_toml("").expect("empty is valid"));

        assert_eq!(config, before);
    }

    #[test]
    fn explicit_dirs_win_over_defaults() {
        let ws = WorkspaceConfig {
            worktrees_dir: Some(PathBuf::from("/tmp/wt")),
            ..Default::default()
        };
        assert_eq!(ws.worktrees_dir_or_default(), PathBuf::from("/tmp/wt"));
        assert!(ws.projects_dir_or_default().ends_with("projects"));
    }
}
