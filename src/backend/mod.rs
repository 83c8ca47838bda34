use std::path::Path;

use tracing::{debug, warn};

use crate::config::{BackendChoice, RepoMode, ResolveConfig};
use crate::core::package::PackageRecord;
use crate::error::Result;
use crate::format::{parse_index, unpack_document};

pub mod fixture;
pub mod git;
pub mod http;
pub mod traits;

pub use fixture::FixtureBackend;
pub use git::GitArchiveBackend;
pub use http::HttpIndexBackend;
pub use traits::PackageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Fixture,
    HttpIndex,
    GitArchive,
}

pub fn backend_kind(config: &ResolveConfig) -> BackendKind {
    match (config.repo_mode, config.backend) {
        (RepoMode::Test, _) => BackendKind::Fixture,
        (RepoMode::Prod, Some(BackendChoice::Git)) => BackendKind::GitArchive,
        (RepoMode::Prod, Some(BackendChoice::Http)) => BackendKind::HttpIndex,
        (RepoMode::Prod, None) if looks_like_git_remote(&config.repository_url) => {
            BackendKind::GitArchive
        }
        (RepoMode::Prod, None) => BackendKind::HttpIndex,
    }
}

pub fn looks_like_git_remote(url: &str) -> bool {
    let url = url.trim().trim_end_matches('/');
    url.ends_with(".git")
        || url.starts_with("git@")
        || url.starts_with("git://")
        || url.starts_with("ssh://")
}

pub fn open_backend(config: &ResolveConfig) -> Result<Box<dyn PackageSource>> {
    let kind = backend_kind(config);
    debug!(?kind, url = %config.repository_url, "opening backend");
    let backend: Box<dyn PackageSource> = match kind {
        BackendKind::Fixture => Box::new(FixtureBackend::open(Path::new(&config.repository_url))?),
        BackendKind::HttpIndex => Box::new(HttpIndexBackend::new(
            config.repository_url.clone(),
            &config.transport,
        )?),
        BackendKind::GitArchive => Box::new(GitArchiveBackend::new(config.repository_url.clone())),
    };
    Ok(backend)
}

/// Unpacks and parses an index document; unreadable documents yield no records.
pub(crate) fn index_records(bytes: Vec<u8>, origin: &str) -> Vec<PackageRecord> {
    match unpack_document(bytes).and_then(|text| parse_index(&text)) {
        Ok(records) => {
            debug!(origin, records = records.len(), "parsed index document");
            records
        }
        Err(err) => {
            warn!(origin, error = %err, "ignoring malformed index document");
            Vec::new()
        }
    }
}
