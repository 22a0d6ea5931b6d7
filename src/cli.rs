//! Command-line interface definitions for md5ls.
//!
//! This module defines all CLI arguments and subcommands using the clap
//! derive API. Options that can also come from the configuration file are
//! `Option`s (or flags that only ever switch a setting on), so that
//! [`Config::merge_create_args`](crate::config::Config::merge_create_args)
//! can tell "not given" apart from an explicit value.
//!
//! # Example
//!
//! ```bash
//! # Manifest of the current directory to stdout
//! md5ls create
//!
//! # Manifest of ~/photos, hashed on 8 threads, sorted by hash
//! md5ls create -r ~/photos -j 8 -k -o photos.md5
//!
//! # Compare two manifests
//! md5ls diff before.md5 after.md5
//!
//! # Counts only
//! md5ls diff -s before.md5 after.md5
//! ```

use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::manifest::{SortKey, MAX_JOBS};
use crate::output::ReportFormat;

/// Build and compare content manifests of directory trees.
///
/// A manifest lists every regular file under a root as an MD5 fingerprint
/// and a relative path. Diffing two manifests shows which files exist on
/// only one side and which were moved.
#[derive(Debug, Parser)]
#[command(name = "md5ls")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a configuration file (TOML)
    ///
    /// Defaults to config.toml in the platform configuration directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hash every file under a directory and write a manifest
    Create(CreateArgs),
    /// Compare two manifests
    Diff(DiffArgs),
}

/// Arguments for the create subcommand.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Directory to walk
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root_dir: PathBuf,

    /// Write the manifest to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out_file: Option<PathBuf>,

    /// Number of hashing threads (1-60)
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Sort by fingerprint instead of path
    #[arg(short = 'k', long = "k1", conflicts_with = "sort_by")]
    pub sort_by_hash: bool,

    /// Sort key for manifest lines
    #[arg(long, value_enum, value_name = "KEY")]
    pub sort_by: Option<SortKey>,

    /// Follow symbolic links
    ///
    /// Links to files are hashed either way; this makes the walk descend
    /// into linked directories.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Glob patterns to exclude, relative to the root (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// NFC-normalize paths before writing them
    #[arg(long)]
    pub normalize_unicode: bool,

    /// Read buffer size for hashing (e.g. 32KiB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Do not show progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl CreateArgs {
    /// Sort key requested on the command line, if any.
    #[must_use]
    pub fn sort_key(&self) -> Option<SortKey> {
        if self.sort_by_hash {
            Some(SortKey::Hash)
        } else {
            self.sort_by
        }
    }
}

/// Arguments for the diff subcommand.
#[derive(Debug, Args)]
pub struct DiffArgs {
    /// First (left) manifest
    #[arg(value_name = "LEFT_FILE")]
    pub left_file: PathBuf,

    /// Second (right) manifest
    #[arg(value_name = "RIGHT_FILE")]
    pub right_file: PathBuf,

    /// Print only the three count lines
    #[arg(short, long)]
    pub summary: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out_file: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,
}

/// Parse a `--jobs` value in `1..=60`.
///
/// # Errors
///
/// Returns an error for non-numeric input or a value out of range.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{s}'"))?;

    if (1..=MAX_JOBS).contains(&jobs) {
        Ok(jobs)
    } else {
        Err(format!("jobs must be between 1 and {MAX_JOBS}"))
    }
}

/// Parse a human-readable size string into bytes.
///
/// Accepts whatever [`ByteSize`] parses: plain byte counts and decimal or
/// binary suffixes (`KB`, `KiB`, `MB`, `MiB`, ...), case-insensitive.
///
/// # Examples
///
/// ```
/// use md5ls::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("32KiB").unwrap(), 32_768);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
/// # Errors
///
/// Returns an error if the string is not a valid size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    s.trim()
        .parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
