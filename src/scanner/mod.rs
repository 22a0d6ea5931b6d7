//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sorted directory walking using jwalk
//! - Streaming content hashing with MD5
//! - Relative, forward-slash path normalization
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: MD5 file hashing (streaming)
//! - [`path_utils`]: Conversion of absolute paths to manifest paths
//!
//! # Example
//!
//! ```no_run
//! use md5ls::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{Hasher, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use walker::Walker;

/// A regular file discovered by the walker.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path to the file (root-joined, not yet relative)
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
    /// Whether this entry was reached through a symbolic link
    pub is_symlink: bool,
}

/// Configuration for directory walking.
///
/// Every knob defaults to off so a default walk covers every regular file.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symbolic links to directories.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors that can occur during file hashing.
///
/// These are always recovered locally: the file is left out of the
/// manifest and a warning is logged.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file vanished between discovery and hashing.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
