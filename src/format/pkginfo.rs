use std::io::{BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;

use crate::core::package::{PackageRecord, PartialRecord};
use crate::format::{
    decode_text, find_tar_member, is_gzip, FormatError, FormatResult, PKGINFO_MEMBER,
};

/// Parses an embedded `.PKGINFO` member.
///
/// `pkgname` and `pkgver` set the name and version; repeated `depend` lines
/// are joined with spaces into the raw depends string.
pub fn parse_pkginfo(bytes: &[u8]) -> FormatResult<Option<PackageRecord>> {
    let text = decode_text(bytes)?;
    let mut record = PartialRecord::default();
    let mut depends: Vec<&str> = Vec::new();

    for line in text.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "pkgname" => record.name = Some(value.to_string()),
            "pkgver" => record.version = Some(value.to_string()),
            "depend" => depends.push(value),
            _ => {}
        }
    }
    if !depends.is_empty() {
        record.depends = Some(depends.join(" "));
    }

    Ok(record.finish())
}

/// Reads the metadata record out of a package archive.
pub fn extract_pkginfo(archive: &[u8]) -> FormatResult<Option<PackageRecord>> {
    read_pkginfo(archive)
}

/// Streams a package archive and stops at its `.PKGINFO` member.
///
/// The payload that follows the metadata is neither read nor decompressed.
pub fn read_pkginfo<R: Read>(reader: R) -> FormatResult<Option<PackageRecord>> {
    let mut reader = BufReader::new(reader);
    let compressed = is_gzip(reader.fill_buf().map_err(FormatError::Archive)?);
    let member = if compressed {
        find_tar_member(MultiGzDecoder::new(reader), PKGINFO_MEMBER)?
    } else {
        find_tar_member(reader, PKGINFO_MEMBER)?
    };
    match member {
        Some(member) => parse_pkginfo(&member),
        None => Ok(None),
    }
}
