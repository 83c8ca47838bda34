use crate::core::package::PackageRecord;
use crate::error::Result;

/// A repository that can describe packages by name.
///
/// `Ok(None)` means the name is unknown to the repository (or its document
/// could not be read); errors are reserved for an unreachable repository or a
/// version constraint that no candidate satisfies.
pub trait PackageSource: Send {
    fn kind(&self) -> &'static str;

    fn lookup(&mut self, name: &str, version: Option<&str>) -> Result<Option<PackageRecord>>;
}
