//! Report formatters and output sinks.
//!
//! - [`text`] renders a [`DiffResult`](crate::diff::DiffResult) as headed
//!   sections of `<`/`>` records
//! - [`json`] renders the same result for scripting
//!
//! Everything is encoded as UTF-8 with LF line endings. File sinks are
//! written atomically: content goes to a temporary file next to the target,
//! which is renamed into place only after the full payload has been written.
//! A failed run therefore never leaves a partial file behind.
//!
//! # Example
//!
//! ```
//! use md5ls::diff::diff_manifests;
//! use md5ls::manifest::parse_manifest;
//! use md5ls::output::{ReportLabels, ReportMode, TextReport};
//!
//! let left = parse_manifest("0123456789abcdef0123456789abcdef  ./a.txt\n").unwrap();
//! let right = parse_manifest("").unwrap();
//! let result = diff_manifests(&left, &right).unwrap();
//!
//! let labels = ReportLabels::new("old.md5", "new.md5");
//! let text = TextReport::new(&result, &labels, ReportMode::Summary).render();
//! assert!(text.starts_with("1 files found only in the left manifest, old.md5\n"));
//! ```

pub mod json;
pub mod text;

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

pub use json::JsonReport;
pub use text::TextReport;

/// How much of a diff to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Headings followed by every record
    #[default]
    Full,
    /// Headings only
    Summary,
}

/// Report encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain text sections
    #[default]
    Text,
    /// JSON document
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Display names of the two compared manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLabels {
    /// Label for the left manifest
    pub left: String,
    /// Label for the right manifest
    pub right: String,
}

impl ReportLabels {
    /// Create labels from explicit strings.
    #[must_use]
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Label each manifest with its file name (the full path if it has none).
    #[must_use]
    pub fn from_paths(left: &Path, right: &Path) -> Self {
        Self::new(file_label(left), file_label(right))
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
        .into_owned()
}

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Standard output
    Console,
    /// A file, replaced atomically
    File(PathBuf),
}

impl OutputSink {
    /// `File` if a path is given, otherwise `Console`.
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Console, Self::File)
    }

    /// Write the whole payload to this sink.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the payload cannot be written or the file
    /// cannot be moved into place.
    pub fn write_all(&self, contents: &[u8]) -> Result<(), OutputError> {
        match self {
            Self::Console => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(contents)
                    .and_then(|()| handle.flush())
                    .map_err(OutputError::Stdout)
            }
            Self::File(path) => write_atomic(path, contents),
        }
    }
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, then rename it over the target.
///
/// # Errors
///
/// Returns [`OutputError::File`] on any I/O failure; the target is left
/// untouched in that case.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let file_error = |source: io::Error| OutputError::File {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(parent).map_err(file_error)?;
    temp.write_all(contents).map_err(file_error)?;
    temp.as_file().sync_all().map_err(file_error)?;
    temp.persist(path).map_err(|e| file_error(e.error))?;

    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Errors that can occur while emitting output.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// Writing to stdout failed
    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),

    /// Writing the output file failed
    #[error("Failed to write {}: {source}", path.display())]
    File {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}
