//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.hydra/config.toml`)
//! 3. Project config (`<root>/.hydra/config.toml`)
//! 4. Environment variables (`HYDRA_*`)
//!
//! Each layer overrides every key it names, including keys set back to
//! their default value. CLI flags are applied afterwards
//! through a [`ConfigResolver`](super::ConfigResolver).

use super::{
    default_config_path, ConfigError, ConfigLayer, ConfigSource, HydraConfig, PROJECT_CONFIG_DIR,
    PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing environment variables through a parser
/// returning `Option`.
macro_rules! parse_env {
    ($field:expr, $var:literal, $parse:expr, $expected:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = $parse(&val).ok_or_else(|| ConfigError::invalid_env_var($var, $expected))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use hydra_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), hydra_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.hydra/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.hydra/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be parsed,
    /// or an environment variable holds an invalid value.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<HydraConfig, ConfigError> {
        let mut config = HydraConfig::default();

        // Layer 1: Global config
        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(layer) = load_layer(&global_path, ConfigSource::Global)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.apply(&layer);
            }
        }

        // Layer 2: Project config
        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(layer) = load_layer(&project_config_path, ConfigSource::Project)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.apply(&layer);
                }
            }
        }

        // Layer 3: Environment variables
        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        Ok(config)
    }
}

/// Reads one config file, returning `None` if it doesn't exist.
fn load_layer(path: &Path, source: ConfigSource) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(source, path, e))?;
    let layer =
        ConfigLayer::from_toml(&content).map_err(|e| ConfigError::parse_toml(source, path, e))?;

    Ok(Some(layer))
}

/// Applies environment variable overrides.
fn apply_env_vars(config: &mut HydraConfig) -> Result<(), ConfigError> {
    parse_env!(config.debug, "HYDRA_DEBUG", parse_bool, "expected bool");
    parse_env!(
        config.engine.max_dispatch_depth,
        "HYDRA_MAX_DISPATCH_DEPTH",
        parse_depth,
        "expected a positive integer"
    );

    if let Ok(val) = std::env::var("HYDRA_PROJECTS_DIR") {
        config.workspace.projects_dir = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("HYDRA_LOG_LEVEL") {
        config.logging.level = Some(val);
    }

    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_depth(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().filter(|d| *d > 0)
}
