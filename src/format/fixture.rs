use tracing::debug;

use crate::core::package::PackageRecord;
use crate::format::{decode_text, FormatResult};

/// Version assigned to every fixture record.
pub const FIXTURE_VERSION: &str = "1.0";

/// Parses a `name:dep1 dep2` fixture document, one record per line.
pub fn parse_fixture(bytes: &[u8]) -> FormatResult<Vec<PackageRecord>> {
    let text = decode_text(bytes)?;
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((name, depends)) = line.split_once(':') else {
            debug!(line = idx + 1, "skipping fixture line without ':'");
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            debug!(line = idx + 1, "skipping fixture line without a name");
            continue;
        }
        records.push(PackageRecord::new(
            name,
            Some(FIXTURE_VERSION.to_string()),
            depends.trim(),
        ));
    }

    Ok(records)
}
