use serde::Serialize;

use crate::core::depend::split_depends;

/// A single package as described by one repository document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: Option<String>,
    /// Raw space-separated dependency tokens, operators included.
    pub depends: String,
}

impl PackageRecord {
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        depends: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            depends: depends.into(),
        }
    }

    pub fn version_or_unknown(&self) -> &str {
        self.version.as_deref().unwrap_or("unknown")
    }

    /// Normalized dependency names in declaration order, duplicates kept.
    pub fn dependencies(&self) -> Vec<String> {
        split_depends(&self.depends)
    }
}

/// Fields collected while reading a document, before the name is known to be present.
#[derive(Debug, Default)]
pub(crate) struct PartialRecord {
    pub name: Option<String>,
    pub version: Option<String>,
    pub depends: Option<String>,
}

impl PartialRecord {
    pub fn finish(self) -> Option<PackageRecord> {
        let name = self.name.filter(|name| !name.is_empty())?;
        Some(PackageRecord {
            name,
            version: self.version,
            depends: self.depends.unwrap_or_default(),
        })
    }
}
