//! Manifest text parser.
//!
//! Lines are split at fixed offsets: the first [`FINGERPRINT_LEN`] bytes are
//! the fingerprint, the next two are the separator, and the rest is the
//! path. The `./` prefix is dropped when present. Nothing about the
//! fingerprint field is validated beyond its width; it is an opaque key.

use super::{
    Fingerprint, ManifestEntry, ManifestIndex, RelativePath, FINGERPRINT_LEN, MIN_LINE_LEN,
    PATH_PREFIX,
};

/// Errors raised while reading manifest text.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The line is too short (or not splittable) to hold a fingerprint and
    /// separator.
    #[error("Malformed manifest line {line}: {content:?} (expected <32-char fingerprint>  ./<path>)")]
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// The offending line, without its terminator
        content: String,
    },
}

/// Parse manifest text into a flat list of entries, in file order.
///
/// Blank lines are skipped. Both LF and CRLF terminators are accepted.
///
/// # Errors
///
/// Returns [`ParseError::MalformedLine`] for the first line shorter than
/// the fixed fingerprint + separator prefix.
pub fn parse_entries(text: &str) -> Result<Vec<ManifestEntry>, ParseError> {
    let mut entries = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_line(idx + 1, line)?);
    }

    log::debug!("Parsed {} manifest entries", entries.len());
    Ok(entries)
}

/// Parse manifest text into a [`ManifestIndex`].
///
/// # Errors
///
/// See [`parse_entries`].
pub fn parse_manifest(text: &str) -> Result<ManifestIndex, ParseError> {
    Ok(parse_entries(text)?.into_iter().collect())
}

fn parse_line(line_number: usize, line: &str) -> Result<ManifestEntry, ParseError> {
    let malformed = || ParseError::MalformedLine {
        line: line_number,
        content: line.to_string(),
    };

    if line.len() < MIN_LINE_LEN {
        return Err(malformed());
    }

    let fingerprint = line.get(..FINGERPRINT_LEN).ok_or_else(malformed)?;
    let rest = line.get(MIN_LINE_LEN..).ok_or_else(malformed)?;
    let path = rest.strip_prefix(PATH_PREFIX).unwrap_or(rest);

    Ok(ManifestEntry {
        fingerprint: Fingerprint::new(fingerprint),
        path: RelativePath::new(path),
    })
}
