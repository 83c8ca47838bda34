use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::backend::traits::PackageSource;
use crate::core::package::PackageRecord;
use crate::error::{ApkgraphError, Result};
use crate::format::parse_fixture;

/// Serves packages from a static `name:deps` document.
#[derive(Debug, Default)]
pub struct FixtureBackend {
    packages: HashMap<String, PackageRecord>,
}

impl FixtureBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))
            .map_err(ApkgraphError::Other)?;
        Ok(Self::parse(&bytes))
    }

    pub fn parse(bytes: &[u8]) -> Self {
        match parse_fixture(bytes) {
            Ok(records) => Self::from_records(records),
            Err(err) => {
                warn!(error = %err, "ignoring malformed fixture document");
                Self::default()
            }
        }
    }

    /// Later records replace earlier ones with the same name.
    pub fn from_records(records: Vec<PackageRecord>) -> Self {
        let packages = records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();
        Self { packages }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageSource for FixtureBackend {
    fn kind(&self) -> &'static str {
        "fixture"
    }

    fn lookup(&mut self, name: &str, version: Option<&str>) -> Result<Option<PackageRecord>> {
        if let Some(version) = version {
            debug!(name, version, "fixture lookups ignore version constraints");
        }
        Ok(self.packages.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::fixture::FixtureBackend;
    use crate::backend::traits::PackageSource;

    #[test]
    fn looks_up_by_name_and_ignores_version() {
        let mut backend = FixtureBackend::parse(b"A:B C\nB:\n");
        assert_eq!(backend.len(), 2);

        let record = backend
            .lookup("A", Some("9.9"))
            .expect("lookup")
            .expect("record");
        assert_eq!(record.depends, "B C");
        assert_eq!(record.version.as_deref(), Some("1.0"));
        assert!(backend.lookup("Z", None).expect("lookup").is_none());
    }

    #[test]
    fn later_duplicate_lines_win() {
        let mut backend = FixtureBackend::parse(b"A:B\nA:C\n");
        let record = backend.lookup("A", None).expect("lookup").expect("record");
        assert_eq!(record.depends, "C");
    }

    #[test]
    fn undecodable_fixture_is_empty() {
        let backend = FixtureBackend::parse(&[b'A', b':', 0xff]);
        assert!(backend.is_empty());
    }
}
