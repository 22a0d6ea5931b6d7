//! JSON diff report for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "left": "old.md5",
//!   "right": "new.md5",
//!   "summary": {
//!     "unique_left": 1,
//!     "unique_right": 0,
//!     "moved_left": 1,
//!     "moved_right": 1,
//!     "moved": { "paired": 1 }
//!   },
//!   "unique_left": [
//!     { "side": "left", "fingerprint": "0123...", "path": "a.txt" }
//!   ],
//!   "unique_right": [],
//!   "moved": [ ... ]
//! }
//! ```
//!
//! The three record lists are omitted in summary mode.

use serde::Serialize;

use super::{ReportLabels, ReportMode};
use crate::diff::{ChangeRecord, DiffResult, MovedCount};

/// Summary counts in JSON format.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JsonSummary {
    /// Records only in the left manifest
    pub unique_left: usize,
    /// Records only in the right manifest
    pub unique_right: usize,
    /// Left-tagged moved records
    pub moved_left: usize,
    /// Right-tagged moved records
    pub moved_right: usize,
    /// Moved-file count
    pub moved: MovedCount,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Left manifest label
    pub left: &'a str,
    /// Right manifest label
    pub right: &'a str,
    /// Counts
    pub summary: JsonSummary,
    /// Unique-left records (full mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_left: Option<&'a [ChangeRecord]>,
    /// Unique-right records (full mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_right: Option<&'a [ChangeRecord]>,
    /// Moved records (full mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved: Option<&'a [ChangeRecord]>,
}

impl<'a> JsonReport<'a> {
    /// Build a report view over `result`.
    #[must_use]
    pub fn new(result: &'a DiffResult, labels: &'a ReportLabels, mode: ReportMode) -> Self {
        let counts = result.summary();
        let full = mode == ReportMode::Full;

        Self {
            left: &labels.left,
            right: &labels.right,
            summary: JsonSummary {
                unique_left: counts.unique_left,
                unique_right: counts.unique_right,
                moved_left: counts.moved_left,
                moved_right: counts.moved_right,
                moved: counts.moved_files(),
            },
            unique_left: full.then_some(result.unique_left.as_slice()),
            unique_right: full.then_some(result.unique_right.as_slice()),
            moved: full.then_some(result.moved.as_slice()),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
