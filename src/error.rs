use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ApkgraphError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("repository unavailable at {root}: {}", .attempts.join("; "))]
    Unavailable { root: String, attempts: Vec<String> },
    #[error("git error: {0}")]
    Git(#[source] anyhow::Error),
    #[error(
        "version '{requested}' of {name} not found, available: {}",
        .available.join(", ")
    )]
    VersionNotFound {
        name: String,
        requested: String,
        available: Vec<String>,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ApkgraphError>;
