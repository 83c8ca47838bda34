pub mod resolve;
pub mod settings;

pub use settings::{
    BackendChoice, OutputFormat, RepoMode, ResolveConfig, SettingsFile, TransportConfig,
    TransportSettings,
};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required parameter '{0}'")]
    MissingField(&'static str),
    #[error("invalid value '{value}' for '{field}'")]
    Invalid { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
