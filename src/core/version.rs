use crate::core::package::PackageRecord;
use crate::error::{ApkgraphError, Result};

/// Picks one record among same-named candidates.
///
/// Without a constraint the first candidate in document order wins. With a
/// constraint the first candidate whose version starts with it wins; when no
/// candidate qualifies the available versions are returned in the error.
pub fn select_version(
    candidates: Vec<PackageRecord>,
    constraint: Option<&str>,
) -> Result<Option<PackageRecord>> {
    let Some(constraint) = constraint else {
        return Ok(candidates.into_iter().next());
    };
    if candidates.is_empty() {
        return Ok(None);
    }

    let available: Vec<String> = candidates
        .iter()
        .map(|record| record.version_or_unknown().to_string())
        .collect();
    let name = candidates[0].name.clone();

    match candidates.into_iter().find(|record| {
        record
            .version
            .as_deref()
            .is_some_and(|version| version.starts_with(constraint))
    }) {
        Some(record) => Ok(Some(record)),
        None => Err(ApkgraphError::VersionNotFound {
            name,
            requested: constraint.to_string(),
            available,
        }),
    }
}

/// Filters `records` down to `name` and applies [`select_version`].
pub fn find_package(
    records: &[PackageRecord],
    name: &str,
    constraint: Option<&str>,
) -> Result<Option<PackageRecord>> {
    let candidates = records
        .iter()
        .filter(|record| record.name == name)
        .cloned()
        .collect();
    select_version(candidates, constraint)
}
