//! Fingerprint → paths multimap built from a parsed manifest.

use std::collections::HashMap;

use super::{Fingerprint, ManifestEntry, RelativePath};

/// Mapping from fingerprint to every path recorded under it.
///
/// Paths keep parse order and are never deduplicated: a line repeated in
/// the manifest yields the path twice. Fingerprints iterate in order of
/// first appearance, which keeps diff output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestIndex {
    order: Vec<Fingerprint>,
    paths: HashMap<Fingerprint, Vec<RelativePath>>,
}

impl ManifestIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` under `fingerprint`.
    pub fn insert(&mut self, fingerprint: Fingerprint, path: RelativePath) {
        match self.paths.get_mut(&fingerprint) {
            Some(paths) => paths.push(path),
            None => {
                self.order.push(fingerprint.clone());
                self.paths.insert(fingerprint, vec![path]);
            }
        }
    }

    /// Fingerprints in order of first appearance.
    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the index holds no fingerprints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of paths across all fingerprints.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }

    /// Owned copy of the underlying map, for consumers that need to take
    /// keys out as they go.
    #[must_use]
    pub fn to_map(&self) -> HashMap<Fingerprint, Vec<RelativePath>> {
        self.paths.clone()
    }
}

impl FromIterator<ManifestEntry> for ManifestIndex {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        let mut index = Self::new();
        for entry in iter {
            index.insert(entry.fingerprint, entry.path);
        }
        index
    }
}
