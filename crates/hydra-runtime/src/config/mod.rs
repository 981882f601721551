//! Configuration management with hierarchical layering.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)            │
//! ├───────────────────────────────────────────┤
//! │  2. Environment Variables (HYDRA_*)       │
//! ├───────────────────────────────────────────┤
//! │  3. Project Config (.hydra/config.toml)   │
//! ├───────────────────────────────────────────┤
//! │  4. Global Config (~/.hydra/config.toml)  │
//! ├───────────────────────────────────────────┤
//! │  5. Default Values (compile-time)         │
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `HYDRA_DEBUG` | `debug` | bool |
//! | `HYDRA_MAX_DISPATCH_DEPTH` | `engine.max_dispatch_depth` | usize |
//! | `HYDRA_PROJECTS_DIR` | `workspace.projects_dir` | PathBuf |
//! | `HYDRA_LOG_LEVEL` | `logging.level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.hydra/config.toml
//! debug = false
//!
//! [engine]
//! max_dispatch_depth = 8
//!
//! [workspace]
//! worktrees_dir = "~/.hydra/worktrees"
//! projects_dir = "~/.hydra/projects"
//! keepfiles_file = ".keepfiles"
//! initial_mode = "workspace"
//!
//! [logging]
//! level = "info"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::{ConfigError, ConfigSource};
pub use loader::ConfigLoader;
pub use resolver::ConfigResolver;
pub use types::{
    ConfigLayer, EngineConfig, EngineLayer, HydraConfig, LoggingConfig, WorkspaceConfig,
    WorkspaceLayer,
};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".hydra")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".hydra";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
