//! Manifest data model, text format, construction and parsing.
//!
//! A manifest lists every regular file below a root directory together
//! with its MD5 fingerprint, one entry per line:
//!
//! ```text
//! d41d8cd98f00b204e9800998ecf8427e  ./empty.txt
//! 5d41402abc4b2a76b9719d911017c592  ./docs/hello.txt
//! ```
//!
//! The layout matches `md5sum` output: a 32 character fingerprint, two
//! spaces, then the root-relative path prefixed with `./`. Files are UTF-8
//! with LF line endings on every platform.
//!
//! # Submodules
//!
//! - [`builder`]: walk + hash + sort a directory into a [`Manifest`]
//! - [`parser`]: read manifest text back into a [`ManifestIndex`]
//! - [`index`]: the fingerprint → paths multimap consumed by the diff engine

pub mod builder;
pub mod index;
pub mod parser;

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

pub use builder::{BuildError, BuildSummary, BuilderConfig, ManifestBuilder, MAX_JOBS};
pub use index::ManifestIndex;
pub use parser::{parse_entries, parse_manifest, ParseError};

/// Width of the fingerprint field in a manifest line.
pub const FINGERPRINT_LEN: usize = 32;

/// Separator between fingerprint and path.
pub const SEPARATOR: &str = "  ";

/// Prefix written in front of every path.
pub const PATH_PREFIX: &str = "./";

/// Shortest line the parser accepts: fingerprint plus separator.
pub const MIN_LINE_LEN: usize = FINGERPRINT_LEN + SEPARATOR.len();

/// Content fingerprint: lowercase hex of the file's MD5 digest.
///
/// Treated as an opaque key. Values read back from a manifest are not
/// checked for hex-ness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an existing fingerprint string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Forward-slash path relative to the manifest root, without the `./`
/// prefix used on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Wrap a relative path string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelativePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One manifest line: a fingerprint and the path it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Root-relative path
    pub path: RelativePath,
}

impl ManifestEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(fingerprint: impl Into<Fingerprint>, path: impl Into<RelativePath>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            path: path.into(),
        }
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<String> for RelativePath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.fingerprint, SEPARATOR, PATH_PREFIX, self.path
        )
    }
}

/// Sort order of manifest lines.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// By path, ties broken by fingerprint (`sort -k2`)
    #[default]
    Path,
    /// By fingerprint, ties broken by path (`sort -k1`); groups duplicates
    Hash,
}

impl SortKey {
    /// Total order over entries for this key.
    #[must_use]
    pub fn compare(self, a: &ManifestEntry, b: &ManifestEntry) -> std::cmp::Ordering {
        match self {
            Self::Path => a
                .path
                .cmp(&b.path)
                .then_with(|| a.fingerprint.cmp(&b.fingerprint)),
            Self::Hash => a
                .fingerprint
                .cmp(&b.fingerprint)
                .then_with(|| a.path.cmp(&b.path)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Hash => write!(f, "hash"),
        }
    }
}

/// A sorted, serializable manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    sort_key: SortKey,
}

impl Manifest {
    /// Build a manifest, sorting `entries` by `sort_key`.
    #[must_use]
    pub fn new(mut entries: Vec<ManifestEntry>, sort_key: SortKey) -> Self {
        entries.sort_by(|a, b| sort_key.compare(a, b));
        Self { entries, sort_key }
    }

    /// Entries in output order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// The key the entries are sorted by.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the manifest text, one LF-terminated line per entry.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{entry}");
        }
        out
    }
}
