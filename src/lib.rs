//! md5ls - content manifests for directory trees
//!
//! `md5ls create` walks a directory, hashes every regular file with MD5 and
//! writes an `md5sum`-style manifest of `<fingerprint>  ./<path>` lines.
//! `md5ls diff` compares two manifests and reports files present on only
//! one side and files whose content was moved to a different path.
//!
//! The library is split along the pipeline:
//! - [`scanner`]: directory walking and file hashing
//! - [`manifest`]: manifest building, text format and parsing
//! - [`diff`]: manifest reconciliation
//! - [`output`]: text/JSON reports and atomic file output

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod scanner;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, CreateArgs, DiffArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::manifest::{parse_manifest, ManifestBuilder, ManifestIndex};
use crate::output::{JsonReport, OutputSink, ReportFormat, ReportLabels, TextReport};
use crate::progress::Progress;

/// Run md5ls with parsed arguments.
///
/// # Errors
///
/// Returns the first fatal error, with context. [`ExitCode::from_error`]
/// maps it to a process exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref());
    config.merge_cli(&cli);

    match &cli.command {
        Commands::Create(args) => {
            config.merge_create_args(args);
            log::debug!("Effective configuration: {:?}", config);
            run_create(args, &config)
        }
        Commands::Diff(args) => {
            config.merge_diff_args(args);
            log::debug!("Effective configuration: {:?}", config);
            run_diff(args, &config)
        }
    }
}

fn run_create(args: &CreateArgs, config: &Config) -> Result<ExitCode> {
    let mut builder_config = config.builder_config();
    if config.progress {
        builder_config = builder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let (manifest, summary) = ManifestBuilder::new(builder_config)
        .build(&args.root_dir)
        .with_context(|| format!("Failed to build manifest for {}", args.root_dir.display()))?;

    if summary.is_partial() {
        log::warn!(
            "Manifest is incomplete: {} unreadable files, {} walk errors",
            summary.files_skipped,
            summary.walk_errors
        );
    }

    OutputSink::from_option(args.out_file.clone())
        .write_all(manifest.to_text().as_bytes())
        .context("Failed to write manifest")?;

    log::info!("Wrote {} manifest entries", manifest.len());
    Ok(ExitCode::Success)
}

fn run_diff(args: &DiffArgs, config: &Config) -> Result<ExitCode> {
    let left = load_manifest(&args.left_file)?;
    let right = load_manifest(&args.right_file)?;

    let result = diff::diff_manifests(&left, &right).context("Failed to compare manifests")?;

    let labels = ReportLabels::from_paths(&args.left_file, &args.right_file);
    let mode = config.report_mode();
    let rendered = match config.format {
        ReportFormat::Text => TextReport::new(&result, &labels, mode).render(),
        ReportFormat::Json => {
            let mut json = JsonReport::new(&result, &labels, mode)
                .to_json_pretty()
                .context("Failed to serialize report")?;
            json.push('\n');
            json
        }
    };

    OutputSink::from_option(args.out_file.clone())
        .write_all(rendered.as_bytes())
        .context("Failed to write report")?;

    Ok(ExitCode::Success)
}

/// Read and parse a manifest file.
///
/// # Errors
///
/// Fails if the file cannot be read as UTF-8 text or contains a malformed
/// line.
pub fn load_manifest(path: &Path) -> Result<ManifestIndex> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let index = parse_manifest(&text)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

    log::debug!(
        "Loaded {} entries ({} fingerprints) from {}",
        index.entry_count(),
        index.len(),
        path.display()
    );
    Ok(index)
}
