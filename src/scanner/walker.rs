//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting every regular file that should appear in a manifest.
//!
//! # Traversal policy
//!
//! - Children are visited in file-name order, so discovery is deterministic
//! - Directories never produce entries (empty directories vanish)
//! - Symlinks to directories are not descended unless `follow_symlinks` is set
//! - Symlinks to regular files are listed and hash their target's content
//! - Dangling symlinks and unreadable directories are reported as
//!   [`ScanError`] values, never as a hard failure
//!
//! # Example
//!
//! ```no_run
//! use md5ls::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Build a matcher from the configured ignore patterns.
    ///
    /// Unlike a VCS-aware walk, no `.gitignore` file is read: only patterns
    /// passed explicitly exclude anything.
    fn build_ignore_matcher(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, matcher: Option<&Gitignore>) -> bool {
        let Some(gi) = matcher else {
            return false;
        };
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        gi.matched_path_or_any_parents(relative, is_dir).is_ignore()
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let matcher = self.build_ignore_matcher();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    // Skip the root directory itself
                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    if self.should_ignore(&path, false, matcher.as_ref()) {
                        log::trace!("Ignoring file: {}", path.display());
                        return None;
                    }

                    let is_symlink = entry.path_is_symlink();

                    // Follow the link (if any) to decide what the entry is
                    let metadata = match std::fs::metadata(&path) {
                        Ok(m) => m,
                        Err(e) => return Some(Err(self.handle_io_error(&path, e))),
                    };

                    if metadata.is_dir() {
                        log::trace!("Not descending symlinked directory: {}", path.display());
                        return None;
                    }
                    if !metadata.is_file() {
                        log::debug!("Skipping special file: {}", path.display());
                        return None;
                    }

                    Some(Ok(FileEntry {
                        path,
                        size: metadata.len(),
                        is_symlink,
                    }))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            })
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!(
                    "File not found (dangling symlink or deleted): {}",
                    path.display()
                );
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        }
    }
}
