use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::backend::index_records;
use crate::backend::traits::PackageSource;
use crate::core::package::PackageRecord;
use crate::core::version::find_package;
use crate::error::{ApkgraphError, Result};
use crate::format::{read_pkginfo, ARCHIVE_EXTENSION, INDEX_FILE_NAMES};
use crate::git::clone_repo;

const CHECKOUT_PREFIX: &str = "apkgraph-checkout-";
const CHECKOUT_DIR: &str = "repo";

/// Serves packages from a shallow checkout of a git remote.
///
/// The checkout lives in a temporary directory owned by the backend and is
/// removed when the backend is dropped, or right away if the clone fails.
#[derive(Debug)]
pub struct GitArchiveBackend {
    url: String,
    scratch: Option<PathBuf>,
    checkout: Option<TempDir>,
    records: Option<Vec<PackageRecord>>,
}

impl GitArchiveBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scratch: None,
            checkout: None,
            records: None,
        }
    }

    /// Places checkouts under `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch = Some(dir.into());
        self
    }

    pub fn checkout_path(&self) -> Option<&Path> {
        self.checkout.as_ref().map(TempDir::path)
    }

    fn records(&mut self) -> Result<&[PackageRecord]> {
        let records = match self.records.take() {
            Some(records) => records,
            None => self.checkout()?,
        };
        Ok(self.records.insert(records).as_slice())
    }

    fn checkout(&mut self) -> Result<Vec<PackageRecord>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(CHECKOUT_PREFIX);
        let dir = match &self.scratch {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .context("failed to create checkout directory")
            .map_err(ApkgraphError::Git)?;
        let worktree = dir.path().join(CHECKOUT_DIR);
        clone_repo(&self.url, &worktree, Some(1))?;
        let records = load_checkout(&worktree)?;
        self.checkout = Some(dir);
        Ok(records)
    }
}

impl PackageSource for GitArchiveBackend {
    fn kind(&self) -> &'static str {
        "git"
    }

    fn lookup(&mut self, name: &str, version: Option<&str>) -> Result<Option<PackageRecord>> {
        find_package(self.records()?, name, version)
    }
}

/// Collects package records from a checked out tree.
///
/// An index document anywhere in the tree takes precedence; otherwise every
/// package archive is opened and its embedded metadata collected.
pub fn load_checkout(root: &Path) -> Result<Vec<PackageRecord>> {
    let mut indexes = Vec::new();
    for name in INDEX_FILE_NAMES {
        indexes.extend(find_files(root, name)?);
    }
    indexes.sort();
    if let Some(index) = indexes.first() {
        info!(path = %index.display(), "found index in checkout");
        let bytes = std::fs::read(index)?;
        return Ok(index_records(bytes, &index.display().to_string()));
    }

    let archives = find_files(root, &format!("*.{ARCHIVE_EXTENSION}"))?;
    info!(count = archives.len(), "no index in checkout, scanning package archives");
    let mut records = Vec::new();
    for archive in archives {
        match read_pkginfo(File::open(&archive)?) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => debug!(path = %archive.display(), "archive has no metadata"),
            Err(err) => warn!(path = %archive.display(), error = %err, "skipping unreadable archive"),
        }
    }
    Ok(records)
}

fn find_files(root: &Path, file_pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        file_pattern
    );
    let paths = glob::glob(&pattern).map_err(|err| ApkgraphError::Other(anyhow::Error::new(err)))?;

    let mut found = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() && !in_git_dir(root, &path) => found.push(path),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "skipping unreadable path in checkout"),
        }
    }
    found.sort();
    Ok(found)
}

fn in_git_dir(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .map(|relative| relative.components().any(|part| part.as_os_str() == ".git"))
        .unwrap_or(false)
}
