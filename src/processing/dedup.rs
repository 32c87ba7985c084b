use crate::bio::normalize::Fingerprint;
use std::collections::HashSet;

/// Run-wide exact-duplicate index.
///
/// One index spans every split and file of a run, so the first occurrence
/// in traversal order wins and later copies are rejected regardless of split.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<Fingerprint>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a fingerprint the first time it is seen; reject repeats
    pub fn register(&mut self, fingerprint: Fingerprint) -> bool {
        self.seen.insert(fingerprint)
    }
}
