//! Manifest construction: walk, hash, relativize, sort.
//!
//! # Overview
//!
//! The builder runs a short pipeline over a root directory:
//! 1. **Walk** - collect every regular file (see [`crate::scanner::Walker`])
//! 2. **Hash** - fingerprint each file, sequentially or on a bounded rayon pool
//! 3. **Relativize** - turn each path into a `/`-separated root-relative path
//! 4. **Sort** - order entries by the configured [`SortKey`]
//!
//! Files that cannot be read are skipped with a warning and recorded in the
//! [`BuildSummary`]. A path that cannot be encoded as UTF-8 aborts the build:
//! a manifest missing such a file would silently misreport the tree.
//!
//! # Example
//!
//! ```no_run
//! use md5ls::manifest::{BuilderConfig, ManifestBuilder, SortKey};
//! use std::path::Path;
//!
//! let config = BuilderConfig::default().with_jobs(4).with_sort_key(SortKey::Hash);
//! let builder = ManifestBuilder::new(config);
//! let (manifest, summary) = builder.build(Path::new(".")).unwrap();
//!
//! print!("{}", manifest.to_text());
//! eprintln!("{} files hashed, {} skipped", summary.files_hashed, summary.files_skipped);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::{Fingerprint, Manifest, ManifestEntry, RelativePath, SortKey};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::path_utils::{self, PathError};
use crate::scanner::{FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Upper bound on worker threads.
pub const MAX_JOBS: usize = 60;

/// Configuration for [`ManifestBuilder`].
#[derive(Clone)]
pub struct BuilderConfig {
    /// Number of hashing workers. 1 hashes on the calling thread.
    pub jobs: usize,
    /// Output ordering.
    pub sort_key: SortKey,
    /// Directory walk options.
    pub walker: WalkerConfig,
    /// Read chunk size handed to the [`Hasher`].
    pub chunk_size: usize,
    /// Normalize paths to Unicode NFC.
    pub normalize_unicode: bool,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for BuilderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderConfig")
            .field("jobs", &self.jobs)
            .field("sort_key", &self.sort_key)
            .field("walker", &self.walker)
            .field("chunk_size", &self.chunk_size)
            .field("normalize_unicode", &self.normalize_unicode)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            sort_key: SortKey::Path,
            walker: WalkerConfig::default(),
            chunk_size: crate::scanner::DEFAULT_CHUNK_SIZE,
            normalize_unicode: false,
            progress_callback: None,
        }
    }
}

impl BuilderConfig {
    /// Set the number of hashing workers (clamped to `1..=MAX_JOBS`).
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.clamp(1, MAX_JOBS);
        self
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Set the hashing chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enable or disable NFC path normalization.
    #[must_use]
    pub fn with_normalize_unicode(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics about a manifest build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Regular files discovered by the walk
    pub files_found: usize,
    /// Files hashed successfully (entries in the manifest)
    pub files_hashed: usize,
    /// Files skipped because they could not be read
    pub files_skipped: usize,
    /// Walk errors (unreadable directories, dangling links)
    pub walk_errors: usize,
    /// Files reached through a symbolic link
    pub symlinks_followed: usize,
    /// Total size of discovered files at walk time
    pub bytes_found: u64,
    /// Total bytes fed to the hasher
    pub bytes_hashed: u64,
    /// Per-file hashing failures
    pub skipped: Vec<HashError>,
    /// Time spent walking
    pub walk_duration: Duration,
    /// Time spent hashing
    pub hash_duration: Duration,
}

impl BuildSummary {
    /// Whether any file or directory had to be skipped.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.files_skipped > 0 || self.walk_errors > 0
    }
}

/// Errors that abort a manifest build.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    /// The root does not exist or is not a directory.
    #[error("Not a directory: {0}")]
    PathNotDirectory(PathBuf),

    /// A file path cannot be written to a UTF-8 manifest.
    #[error("Path contains characters that can't be encoded to UTF-8: {}", .0.display())]
    UnencodableOutputPath(PathBuf),

    /// A discovered path could not be made relative to the root.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Outcome of hashing one file on a worker.
type HashOutcome = Result<(PathBuf, Fingerprint, u64), HashError>;

/// Builds manifests for directory trees.
pub struct ManifestBuilder {
    config: BuilderConfig,
    hasher: Arc<Hasher>,
}

impl ManifestBuilder {
    /// Create a builder with the given configuration.
    #[must_use]
    pub fn new(config: BuilderConfig) -> Self {
        let hasher = Hasher::new().with_chunk_size(config.chunk_size);
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a builder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(BuilderConfig::default())
    }

    /// Build the manifest for `root`.
    ///
    /// # Errors
    ///
    /// - [`BuildError::PathNotDirectory`] before any hashing if `root` is not
    ///   an existing directory
    /// - [`BuildError::UnencodableOutputPath`] if any path is not UTF-8
    pub fn build(&self, root: &Path) -> Result<(Manifest, BuildSummary), BuildError> {
        let root = path_utils::clean_root_arg(root);
        if !root.is_dir() {
            return Err(BuildError::PathNotDirectory(root));
        }

        let mut summary = BuildSummary::default();

        let walk_start = Instant::now();
        let files = self.collect_files(&root, &mut summary);
        summary.walk_duration = walk_start.elapsed();
        summary.files_found = files.len();
        log::info!(
            "Found {} files ({}) under {} ({} walk errors)",
            files.len(),
            ByteSize::b(summary.bytes_found),
            root.display(),
            summary.walk_errors
        );

        let hash_start = Instant::now();
        let outcomes = self.hash_files(files);
        summary.hash_duration = hash_start.elapsed();

        let mut entries = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok((path, fingerprint, bytes)) => {
                    let relative =
                        path_utils::manifest_path(&root, &path, self.config.normalize_unicode)
                            .map_err(|e| match e {
                                PathError::NotUtf8(p) => BuildError::UnencodableOutputPath(p),
                                other => BuildError::Path(other),
                            })?;
                    summary.files_hashed += 1;
                    summary.bytes_hashed += bytes;
                    entries.push(ManifestEntry {
                        fingerprint,
                        path: RelativePath::new(relative),
                    });
                }
                Err(e) => {
                    log::warn!("Skipping unreadable file: {}", e);
                    summary.files_skipped += 1;
                    summary.skipped.push(e);
                }
            }
        }

        log::info!(
            "Hashed {} files ({}) in {:.2?}, {} skipped",
            summary.files_hashed,
            ByteSize::b(summary.bytes_hashed),
            summary.hash_duration,
            summary.files_skipped
        );

        Ok((Manifest::new(entries, self.config.sort_key), summary))
    }

    /// Walk the tree, logging and counting walk errors.
    fn collect_files(&self, root: &Path, summary: &mut BuildSummary) -> Vec<FileEntry> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let walker = Walker::new(root, self.config.walker.clone());
        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if file.is_symlink {
                        log::trace!("Hashing through symlink: {}", file.path.display());
                        summary.symlinks_followed += 1;
                    }
                    summary.bytes_found += file.size;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(ScanError::NotFound(path)) => {
                    log::debug!("Vanished during walk: {}", path.display());
                    summary.walk_errors += 1;
                }
                Err(e) => {
                    log::debug!("Walk error: {}", e);
                    summary.walk_errors += 1;
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }
        files
    }

    /// Hash every file, isolating failures per file.
    fn hash_files(&self, files: Vec<FileEntry>) -> Vec<HashOutcome> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, files.len());
        }

        let hash_one = |(idx, file): (usize, FileEntry)| -> HashOutcome {
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
            }
            let result = self.hasher.full_hash(&file.path);
            if let (Ok((_, bytes)), Some(callback)) = (&result, &self.config.progress_callback) {
                callback.on_item_completed(*bytes);
            }
            result.map(|(fingerprint, bytes)| (file.path, fingerprint, bytes))
        };

        let outcomes: Vec<HashOutcome> = if self.config.jobs <= 1 {
            log::debug!("Hashing {} files sequentially", files.len());
            files.into_iter().enumerate().map(hash_one).collect()
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
            {
                Ok(pool) => {
                    log::debug!(
                        "Hashing {} files on {} workers",
                        files.len(),
                        self.config.jobs
                    );
                    pool.install(|| {
                        files
                            .into_par_iter()
                            .enumerate()
                            .map(hash_one)
                            .collect::<Vec<_>>()
                    })
                }
                Err(e) => {
                    log::warn!("Failed to create worker pool ({}), hashing sequentially", e);
                    files.into_iter().enumerate().map(hash_one).collect()
                }
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }
        outcomes
    }
}
