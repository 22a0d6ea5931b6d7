//! Application configuration management.
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config` or `config.toml` in the platform config dir)
//! 3. Environment variables prefixed with `MD5LS_` (`__` for nesting)
//! 4. Command-line flags
//!
//! A configuration file that cannot be parsed is reported with a warning
//! and ignored; the run continues on defaults and environment.
//!
//! # Example
//!
//! ```toml
//! jobs = 8
//! sort_key = "hash"
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", ".git/"]
//! ```

use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, CreateArgs, DiffArgs};
use crate::manifest::{BuilderConfig, SortKey, MAX_JOBS};
use crate::output::{ReportFormat, ReportMode};
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "MD5LS_";

const KNOWN_KEYS: &[&str] = &[
    "jobs",
    "sort_key",
    "follow_symlinks",
    "skip_hidden",
    "ignore_patterns",
    "normalize_unicode",
    "chunk_size",
    "summary",
    "format",
    "progress",
];

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing threads (1 hashes sequentially)
    pub jobs: usize,
    /// Manifest ordering
    pub sort_key: SortKey,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Glob patterns excluded from manifests
    pub ignore_patterns: Vec<String>,
    /// NFC-normalize manifest paths
    pub normalize_unicode: bool,
    /// Hash read buffer size in bytes
    pub chunk_size: usize,
    /// Print diff counts only
    pub summary: bool,
    /// Diff report format
    pub format: ReportFormat,
    /// Show progress bars while building
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: 1,
            sort_key: SortKey::Path,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            normalize_unicode: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            summary: false,
            format: ReportFormat::Text,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, or from the default path when
    /// `None`.
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    log::warn!("Config file {} does not exist", path.display());
                }
                Self::load_from_path(path)
            }
            None => match Self::config_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    log::debug!("No platform config directory, using defaults");
                    Self::load_layers(None)
                }
            },
        }
    }

    /// Load configuration with `path` as the TOML layer.
    ///
    /// A missing file contributes nothing. A malformed file is skipped with
    /// a warning.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        if path.exists() {
            warn_unknown_keys(path);
        }
        Self::load_layers(Some(path))
    }

    fn load_layers(path: Option<&Path>) -> Self {
        let base = Figment::from(Serialized::defaults(Self::default()));
        let env = || Env::prefixed(ENV_PREFIX).split("__");

        let loaded = match path {
            Some(path) => base
                .clone()
                .merge(Toml::file(path))
                .merge(env())
                .extract::<Self>()
                .or_else(|e| {
                    log::warn!(
                        "Ignoring config file {}: {}",
                        path.display(),
                        e
                    );
                    base.clone().merge(env()).extract::<Self>()
                }),
            None => base.clone().merge(env()).extract::<Self>(),
        };

        let mut config = match loaded {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid {ENV_PREFIX}* environment settings, using defaults: {e}");
                Self::default()
            }
        };
        config.validate();
        config
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "md5ls", "md5ls").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply global flags.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if cli.quiet {
            self.progress = false;
        }
    }

    /// Apply `create` flags.
    pub fn merge_create_args(&mut self, args: &CreateArgs) {
        if let Some(jobs) = args.jobs {
            self.jobs = jobs;
        }
        if let Some(sort_key) = args.sort_key() {
            self.sort_key = sort_key;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
        if args.normalize_unicode {
            self.normalize_unicode = true;
        }
        if let Some(chunk_size) = args.chunk_size {
            // Out-of-range values are capped by validate()
            self.chunk_size = usize::try_from(chunk_size).unwrap_or(usize::MAX);
        }
        if args.no_progress {
            self.progress = false;
        }
        self.validate();
    }

    /// Apply `diff` flags.
    pub fn merge_diff_args(&mut self, args: &DiffArgs) {
        if args.summary {
            self.summary = true;
        }
        if let Some(format) = args.format {
            self.format = format;
        }
    }

    /// Clamp out-of-range values, warning about each.
    pub fn validate(&mut self) {
        if !(1..=MAX_JOBS).contains(&self.jobs) {
            let clamped = self.jobs.clamp(1, MAX_JOBS);
            log::warn!(
                "jobs = {} is outside 1..={MAX_JOBS}, using {clamped}",
                self.jobs
            );
            self.jobs = clamped;
        }
        if self.chunk_size == 0 {
            log::warn!("chunk_size = 0 is invalid, using {DEFAULT_CHUNK_SIZE}");
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        } else if self.chunk_size > MAX_CHUNK_SIZE {
            log::warn!(
                "chunk_size = {} exceeds the {} maximum, capping",
                self.chunk_size,
                ByteSize::b(MAX_CHUNK_SIZE as u64)
            );
            self.chunk_size = MAX_CHUNK_SIZE;
        }
    }

    /// Report mode for `diff`.
    #[must_use]
    pub fn report_mode(&self) -> ReportMode {
        if self.summary {
            ReportMode::Summary
        } else {
            ReportMode::Full
        }
    }

    /// Builder settings for `create` (without a progress callback).
    #[must_use]
    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig::default()
            .with_jobs(self.jobs)
            .with_sort_key(self.sort_key)
            .with_chunk_size(self.chunk_size)
            .with_normalize_unicode(self.normalize_unicode)
            .with_walker_config(WalkerConfig::new(
                self.follow_symlinks,
                self.skip_hidden,
                self.ignore_patterns.clone(),
            ))
    }
}

/// Warn about top-level keys this version does not understand.
fn warn_unknown_keys(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        // Syntax errors are reported by the figment layer
        return;
    };

    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            log::warn!("Unknown config key '{}' in {}", key, path.display());
        }
    }
}
