//! Reconciliation of two manifest indexes.
//!
//! # Algorithm
//!
//! For each fingerprint of the left index, in first-appearance order:
//! 1. absent on the right → every left path is a unique-left record
//! 2. present on both sides with a different ordered path list → every left
//!    path missing from the right list is a left moved record, every right
//!    path missing from the left list is a right moved record
//! 3. identical path lists → nothing
//!
//! Each fingerprint is taken out of the working copies as it is handled.
//! Whatever remains on the right afterwards is unique-right. Both working
//! copies must then be empty; anything left over is a reconciliation bug
//! and is reported as [`DiffError::InternalInconsistency`].
//!
//! Path matching in step 2 is by membership, not position: a path that
//! appears under the fingerprint on both sides is matched however often or
//! wherever it occurs.

use std::collections::{HashMap, HashSet};

use super::{ChangeRecord, DiffResult, Side};
use crate::manifest::{Fingerprint, ManifestIndex, RelativePath};

type WorkingSet = HashMap<Fingerprint, Vec<RelativePath>>;

/// Errors from the diff engine.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DiffError {
    /// Fingerprints survived reconciliation.
    #[error(
        "INTERNAL ERROR: {} left and {} right fingerprints were not reconciled (left: {left_residual:?}, right: {right_residual:?})",
        .left_residual.len(),
        .right_residual.len()
    )]
    InternalInconsistency {
        /// Fingerprints still present in the left working copy
        left_residual: Vec<Fingerprint>,
        /// Fingerprints still present in the right working copy
        right_residual: Vec<Fingerprint>,
    },
}

/// Compare two manifest indexes.
///
/// The inputs are not modified; the engine works on its own copies.
///
/// # Errors
///
/// Returns [`DiffError::InternalInconsistency`] if the working copies are not
/// both empty after reconciliation.
pub fn diff_manifests(left: &ManifestIndex, right: &ManifestIndex) -> Result<DiffResult, DiffError> {
    let mut left_work = left.to_map();
    let mut right_work = right.to_map();
    let mut result = DiffResult::default();

    // Snapshot of keys; the working maps shrink as we go
    let left_keys: Vec<Fingerprint> = left.fingerprints().cloned().collect();

    for fingerprint in left_keys {
        let Some(left_paths) = left_work.remove(&fingerprint) else {
            continue;
        };

        match right_work.remove(&fingerprint) {
            None => {
                result.unique_left.extend(
                    left_paths
                        .into_iter()
                        .map(|p| ChangeRecord::new(Side::Left, fingerprint.clone(), p)),
                );
            }
            Some(right_paths) if right_paths != left_paths => {
                reconcile_moved(&fingerprint, &left_paths, &right_paths, &mut result.moved);
            }
            Some(_) => {}
        }
    }

    let right_keys: Vec<Fingerprint> = right.fingerprints().cloned().collect();
    for fingerprint in right_keys {
        if let Some(right_paths) = right_work.remove(&fingerprint) {
            result.unique_right.extend(
                right_paths
                    .into_iter()
                    .map(|p| ChangeRecord::new(Side::Right, fingerprint.clone(), p)),
            );
        }
    }

    check_residual(&left_work, &right_work)?;

    log::debug!(
        "Diff complete: {} unique left, {} unique right, {} moved records",
        result.unique_left.len(),
        result.unique_right.len(),
        result.moved.len()
    );
    Ok(result)
}

/// Emit moved records for a fingerprint whose path lists differ.
fn reconcile_moved(
    fingerprint: &Fingerprint,
    left_paths: &[RelativePath],
    right_paths: &[RelativePath],
    moved: &mut Vec<ChangeRecord>,
) {
    let left_set: HashSet<&RelativePath> = left_paths.iter().collect();
    let right_set: HashSet<&RelativePath> = right_paths.iter().collect();

    moved.extend(
        left_paths
            .iter()
            .filter(|p| !right_set.contains(p))
            .map(|p| ChangeRecord::new(Side::Left, fingerprint.clone(), p.clone())),
    );
    moved.extend(
        right_paths
            .iter()
            .filter(|p| !left_set.contains(p))
            .map(|p| ChangeRecord::new(Side::Right, fingerprint.clone(), p.clone())),
    );
}

/// Fail unless both working copies were fully consumed.
fn check_residual(left: &WorkingSet, right: &WorkingSet) -> Result<(), DiffError> {
    if left.is_empty() && right.is_empty() {
        return Ok(());
    }

    let mut left_residual: Vec<Fingerprint> = left.keys().cloned().collect();
    let mut right_residual: Vec<Fingerprint> = right.keys().cloned().collect();
    left_residual.sort();
    right_residual.sort();

    log::error!(
        "Reconciliation left residual fingerprints: left={:?} right={:?}",
        left_residual,
        right_residual
    );
    Err(DiffError::InternalInconsistency {
        left_residual,
        right_residual,
    })
}
