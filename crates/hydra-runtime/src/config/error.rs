//! Configuration errors.

use hydra_types::ErrorCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which file layer a config error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// `~/.hydra/config.toml`
    Global,
    /// `<root>/.hydra/config.toml`
    Project,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::Project => "project",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {layer} config '{path}': {source}")]
    ReadFile {
        layer: ConfigSource,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {layer} config '{path}': {source}")]
    ParseToml {
        layer: ConfigSource,
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The resolved config could not be printed back as TOML.
    #[error("cannot encode config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },
}

impl ConfigError {
    pub fn read_file(
        layer: ConfigSource,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::ReadFile {
            layer,
            path: path.into(),
            source,
        }
    }

    pub fn parse_toml(
        layer: ConfigSource,
        path: impl Into<PathBuf>,
        source: toml::de::Error,
    ) -> Self {
        Self::ParseToml {
            layer,
            path: path.into(),
            source,
        }
    }

    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::Serialize(_) => "CONFIG_SERIALIZE",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
