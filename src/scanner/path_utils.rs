//! Conversion of discovered file paths into manifest paths.
//!
//! Manifest paths are relative to the walk root, use `/` as the only
//! separator on every platform, and must be valid UTF-8. Optionally they
//! are normalized to Unicode NFC.
//!
//! # Background
//!
//! macOS uses NFD (Decomposed) normalization for file paths, while Windows
//! and Linux typically use NFC (Composed) normalization. The same visual
//! filename can therefore have different byte representations:
//!
//! - NFC: `café.txt` - 'é' is U+00E9 (single code point)
//! - NFD: `café.txt` - 'e' U+0065 + combining acute accent U+0301
//!
//! Manifests taken on different platforms only compare cleanly when both
//! sides were created with normalization enabled.
//!
//! # Example
//!
//! ```
//! use md5ls::scanner::path_utils::manifest_path;
//! use std::path::Path;
//!
//! let rel = manifest_path(Path::new("/data"), Path::new("/data/a/b.txt"), false).unwrap();
//! assert_eq!(rel, "a/b.txt");
//! ```

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Reasons a path cannot be expressed in manifest form.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The path does not live under the walk root.
    #[error("{path} is not under {root}")]
    NotUnderRoot {
        /// The offending path
        path: PathBuf,
        /// The walk root
        root: PathBuf,
    },

    /// A path component is not valid UTF-8.
    #[error("Path cannot be encoded as UTF-8: {0}")]
    NotUtf8(PathBuf),
}

/// Normalize a path string to NFC, borrowing when it already is NFC.
#[must_use]
pub fn normalize_path_str_cow(s: &str) -> Cow<'_, str> {
    if unicode_normalization::is_nfc(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.nfc().collect())
    }
}

/// Convert `path` into a manifest path relative to `root`.
///
/// Components are joined with `/` regardless of the host separator.
///
/// # Errors
///
/// - [`PathError::NotUnderRoot`] if `path` is not below `root`
/// - [`PathError::NotUtf8`] if any component is not valid UTF-8
pub fn manifest_path(root: &Path, path: &Path, normalize_unicode: bool) -> Result<String, PathError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PathError::NotUnderRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut parts: Vec<&str> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| PathError::NotUtf8(path.to_path_buf()))?;
                parts.push(name);
            }
            Component::CurDir => {}
            other => {
                log::debug!(
                    "Unexpected component {:?} in {}",
                    other.as_os_str(),
                    path.display()
                );
                return Err(PathError::NotUnderRoot {
                    path: path.to_path_buf(),
                    root: root.to_path_buf(),
                });
            }
        }
    }

    let joined = parts.join("/");
    if normalize_unicode {
        Ok(normalize_path_str_cow(&joined).into_owned())
    } else {
        Ok(joined)
    }
}

/// Undo the PowerShell 5 quoting bug for a directory argument.
///
/// PowerShell 5 appends a stray `"` to a quoted argument that ends in a
/// backslash. Only applied on Windows.
#[must_use]
pub fn clean_root_arg(path: &Path) -> PathBuf {
    if cfg!(windows) {
        if let Some(s) = path.to_str() {
            if let Some(stripped) = s.strip_suffix('"') {
                return PathBuf::from(stripped);
            }
        }
    }
    path.to_path_buf()
}
