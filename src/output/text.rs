//! Plain-text diff report.
//!
//! Full mode prints, for each non-empty category (unique left, unique
//! right, moved), a heading line, one line per record and a blank line.
//! Summary mode prints the three headings and nothing else.

use std::fmt::Write as _;

use super::{ReportLabels, ReportMode};
use crate::diff::{ChangeRecord, DiffResult, DiffSummary, MovedCount};

/// Text renderer for a [`DiffResult`].
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    result: &'a DiffResult,
    labels: &'a ReportLabels,
    mode: ReportMode,
}

impl<'a> TextReport<'a> {
    /// Create a new text report.
    #[must_use]
    pub fn new(result: &'a DiffResult, labels: &'a ReportLabels, mode: ReportMode) -> Self {
        Self {
            result,
            labels,
            mode,
        }
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let summary = self.result.summary();
        let [left_heading, right_heading, moved_heading] = headings(&summary, self.labels);

        let mut out = String::new();
        match self.mode {
            ReportMode::Summary => {
                for heading in [left_heading, right_heading, moved_heading] {
                    out.push_str(&heading);
                    out.push('\n');
                }
            }
            ReportMode::Full => {
                push_section(&mut out, &left_heading, &self.result.unique_left);
                push_section(&mut out, &right_heading, &self.result.unique_right);
                push_section(&mut out, &moved_heading, &self.result.moved);
            }
        }
        out
    }
}

/// The three section headings, in print order.
#[must_use]
pub fn headings(summary: &DiffSummary, labels: &ReportLabels) -> [String; 3] {
    let moved = match summary.moved_files() {
        MovedCount::Paired(n) => format!(
            "{n} files which have the same hash, but have been moved to a different path"
        ),
        MovedCount::Unpaired { left, right } => format!(
            "{left} left-side and {right} right-side paths which have the same hash, but differ in path"
        ),
    };

    [
        format!(
            "{} files found only in the left manifest, {}",
            summary.unique_left, labels.left
        ),
        format!(
            "{} files found only in the right manifest, {}",
            summary.unique_right, labels.right
        ),
        moved,
    ]
}

fn push_section(out: &mut String, heading: &str, records: &[ChangeRecord]) {
    if records.is_empty() {
        return;
    }

    out.push_str(heading);
    out.push('\n');
    for record in records {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{record}");
    }
    out.push('\n');
}
