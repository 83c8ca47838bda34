use crate::core::package::{PackageRecord, PartialRecord};
use crate::format::{decode_text, FormatResult};

const NAME_TAG: &str = "P:";
const VERSION_TAG: &str = "V:";
const DEPENDS_TAG: &str = "D:";

/// Parses an index document into records, keeping document order.
///
/// Blocks are separated by blank lines. A block without a name tag carries
/// nothing to look up and is dropped; any other missing tag leaves the field
/// unset.
pub fn parse_index(bytes: &[u8]) -> FormatResult<Vec<PackageRecord>> {
    let text = decode_text(bytes)?;
    let mut records = Vec::new();
    let mut block = PartialRecord::default();
    let mut in_block = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if in_block {
                records.extend(std::mem::take(&mut block).finish());
                in_block = false;
            }
            continue;
        }
        in_block = true;
        if let Some(value) = line.strip_prefix(NAME_TAG) {
            block.name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(VERSION_TAG) {
            block.version = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(DEPENDS_TAG) {
            block.depends = Some(value.trim().to_string());
        }
    }
    if in_block {
        records.extend(block.finish());
    }

    Ok(records)
}
