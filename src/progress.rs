//! Progress reporting utilities using indicatif.
//!
//! The [`ManifestBuilder`](crate::manifest::ManifestBuilder) reports through
//! the [`ProgressCallback`] trait; [`Progress`] renders those events as a
//! spinner for the walk and a bar for hashing. Progress goes to stderr so it
//! never mixes with manifest text on stdout.

use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name used while enumerating files.
pub const PHASE_WALKING: &str = "walking";
/// Phase name used while hashing file contents.
pub const PHASE_HASHING: &str = "hashing";

/// Progress callback for manifest building phases.
///
/// Implementations must be thread-safe: hashing reports from rayon workers.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_HASHING`])
    /// * `total` - Total number of items, or 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based). Parallel hashing reports
    ///   these out of order.
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a file has been hashed, with its size in bytes.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    bytes: Mutex<u64>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use md5ls::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            bytes: Mutex::new(0),
            quiet,
        }
    }

    /// Total bytes reported through [`ProgressCallback::on_item_completed`].
    #[must_use]
    pub fn bytes_completed(&self) -> u64 {
        self.bytes.lock().map(|b| *b).unwrap_or(0)
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                if let Ok(mut walking) = self.walking.lock() {
                    *walking = Some(pb);
                }
            }
            PHASE_HASHING => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Hashing");
                if let Ok(mut hashing) = self.hashing.lock() {
                    *hashing = Some(pb);
                }
            }
            other => log::trace!("Ignoring unknown progress phase {other:?}"),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let message = truncate_path(path, 30);
        if let Ok(hashing) = self.hashing.lock() {
            if let Some(ref pb) = *hashing {
                pb.inc(1);
                pb.set_message(message);
                return;
            }
        }
        if let Ok(walking) = self.walking.lock() {
            if let Some(ref pb) = *walking {
                pb.set_position(current as u64);
                pb.set_message(message);
            }
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        if let Ok(mut total) = self.bytes.lock() {
            *total += bytes;
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                if let Some(pb) = self.walking.lock().ok().and_then(|mut w| w.take()) {
                    pb.finish_with_message("Walking complete");
                }
            }
            PHASE_HASHING => {
                if let Some(pb) = self.hashing.lock().ok().and_then(|mut h| h.take()) {
                    pb.finish_with_message(format!(
                        "Hashing complete ({})",
                        ByteSize::b(self.bytes_completed())
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
