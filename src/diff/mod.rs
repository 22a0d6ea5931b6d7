//! Manifest comparison.
//!
//! This module reconciles two [`ManifestIndex`](crate::manifest::ManifestIndex)
//! values into classified change records:
//! - **unique left**: fingerprint only present in the left manifest
//! - **unique right**: fingerprint only present in the right manifest
//! - **moved**: fingerprint present on both sides with a different path set
//!
//! # Example
//!
//! ```
//! use md5ls::diff::{diff_manifests, MovedCount};
//! use md5ls::manifest::parse_manifest;
//!
//! let left = parse_manifest("0123456789abcdef0123456789abcdef  ./old/a.txt\n").unwrap();
//! let right = parse_manifest("0123456789abcdef0123456789abcdef  ./new/a.txt\n").unwrap();
//!
//! let result = diff_manifests(&left, &right).unwrap();
//! assert_eq!(result.moved.len(), 2);
//! assert_eq!(result.summary().moved_files(), MovedCount::Paired(1));
//! ```

pub mod engine;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::manifest::{Fingerprint, RelativePath};

pub use engine::{diff_manifests, DiffError};

/// Which manifest a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The first (left) manifest
    Left,
    /// The second (right) manifest
    Right,
}

impl Side {
    /// Marker printed in front of a record: `<` or `>`.
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            Self::Left => '<',
            Self::Right => '>',
        }
    }

    /// The opposite side.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// One classified difference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeRecord {
    /// Originating manifest
    pub side: Side,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Path under that fingerprint
    pub path: RelativePath,
}

impl ChangeRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(side: Side, fingerprint: Fingerprint, path: RelativePath) -> Self {
        Self {
            side,
            fingerprint,
            path,
        }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}  {}",
            self.side.marker(),
            self.fingerprint,
            self.path
        )
    }
}

/// Classified output of a manifest comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// Files whose fingerprint only exists on the left
    pub unique_left: Vec<ChangeRecord>,
    /// Files whose fingerprint only exists on the right
    pub unique_right: Vec<ChangeRecord>,
    /// Paths that differ under a fingerprint present on both sides
    pub moved: Vec<ChangeRecord>,
}

impl DiffResult {
    /// Whether the two manifests were equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unique_left.is_empty() && self.unique_right.is_empty() && self.moved.is_empty()
    }

    /// Count summary of this result.
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        let mut per_fingerprint: HashMap<&Fingerprint, (usize, usize)> = HashMap::new();
        for record in &self.moved {
            let counts = per_fingerprint.entry(&record.fingerprint).or_default();
            match record.side {
                Side::Left => counts.0 += 1,
                Side::Right => counts.1 += 1,
            }
        }

        let moved_left = per_fingerprint.values().map(|(l, _)| l).sum();
        let moved_right = per_fingerprint.values().map(|(_, r)| r).sum();
        DiffSummary {
            unique_left: self.unique_left.len(),
            unique_right: self.unique_right.len(),
            moved_left,
            moved_right,
            unbalanced_fingerprints: per_fingerprint.values().filter(|(l, r)| l != r).count(),
        }
    }
}

/// Number of moved files.
///
/// `Paired(n)` when every fingerprint with moved records has as many
/// left-tagged as right-tagged ones, so each left path pairs with a right
/// path. Duplicate content can unbalance a fingerprint (two copies on the
/// left, one on the right); then both sides are reported. Imbalances on
/// different fingerprints never cancel out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovedCount {
    /// Every fingerprint balanced: the number of files
    Paired(usize),
    /// At least one fingerprint unbalanced
    Unpaired {
        /// Left-tagged moved records
        left: usize,
        /// Right-tagged moved records
        right: usize,
    },
}

/// Counts derived from a [`DiffResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Records in `unique_left`
    pub unique_left: usize,
    /// Records in `unique_right`
    pub unique_right: usize,
    /// Left-tagged records in `moved`
    pub moved_left: usize,
    /// Right-tagged records in `moved`
    pub moved_right: usize,
    /// Fingerprints whose left and right moved record counts differ
    pub unbalanced_fingerprints: usize,
}

impl DiffSummary {
    /// The moved-file count, see [`MovedCount`].
    #[must_use]
    pub fn moved_files(&self) -> MovedCount {
        if self.unbalanced_fingerprints == 0 {
            MovedCount::Paired(self.moved_left)
        } else {
            MovedCount::Unpaired {
                left: self.moved_left,
                right: self.moved_right,
            }
        }
    }
}
