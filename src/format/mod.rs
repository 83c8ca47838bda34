use std::io::Read;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod fixture;
pub mod index;
pub mod pkginfo;

pub use fixture::parse_fixture;
pub use index::parse_index;
pub use pkginfo::{extract_pkginfo, parse_pkginfo, read_pkginfo};

/// File names under which a repository index is published.
pub const INDEX_FILE_NAMES: [&str; 2] = ["APKINDEX", "APKINDEX.tar.gz"];
/// Member holding the index text inside an index archive.
pub const INDEX_MEMBER: &str = "APKINDEX";
/// Extension of individual package archives.
pub const ARCHIVE_EXTENSION: &str = "apk";
/// Member holding the metadata record inside a package archive.
pub const PKGINFO_MEMBER: &str = ".PKGINFO";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("document is not valid utf-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("failed to decompress document: {0}")]
    Decompress(#[source] std::io::Error),
    #[error("failed to read archive: {0}")]
    Archive(#[source] std::io::Error),
    #[error("archive has no {0} member")]
    MissingMember(&'static str),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

pub fn is_tar(bytes: &[u8]) -> bool {
    bytes
        .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len())
        .is_some_and(|magic| magic == TAR_MAGIC)
}

/// Turns fetched index bytes into plain index text bytes.
///
/// Gzip payloads are decoded as a multi-member stream; if the result is a tar
/// stream the `APKINDEX` member is returned. Anything else passes through.
pub fn unpack_document(bytes: Vec<u8>) -> FormatResult<Vec<u8>> {
    if !is_gzip(&bytes) {
        return Ok(bytes);
    }
    let decoded = gunzip(&bytes)?;
    if !is_tar(&decoded) {
        return Ok(decoded);
    }
    find_tar_member(decoded.as_slice(), INDEX_MEMBER)?.ok_or(FormatError::MissingMember(INDEX_MEMBER))
}

pub(crate) fn gunzip(bytes: &[u8]) -> FormatResult<Vec<u8>> {
    let mut decoded = Vec::new();
    MultiGzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .map_err(FormatError::Decompress)?;
    Ok(decoded)
}

/// Reads entries until `name` is found; later entries are never read.
pub(crate) fn find_tar_member<R: Read>(reader: R, name: &str) -> FormatResult<Option<Vec<u8>>> {
    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries().map_err(FormatError::Archive)? {
        let mut entry = entry.map_err(FormatError::Archive)?;
        let matches = entry
            .path()
            .map_err(FormatError::Archive)?
            .to_string_lossy()
            .trim_start_matches("./")
            == name;
        if !matches {
            continue;
        }
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(FormatError::Archive)?;
        return Ok(Some(content));
    }
    Ok(None)
}

pub(crate) fn decode_text(bytes: &[u8]) -> FormatResult<&str> {
    Ok(std::str::from_utf8(bytes)?)
}
