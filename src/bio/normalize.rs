//! Sequence cleaning, ambiguity scoring and content fingerprints
//!
//! Quality is always judged on the raw (upper-cased) residues so the
//! ambiguity ratio reflects the true noise level; length checks and
//! fingerprints are taken on the cleaned residues.

use std::fmt;

#[inline]
fn is_canonical(base: u8) -> bool {
    matches!(base.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T')
}

/// Fraction of symbols outside {A,C,G,T}, case-insensitive.
/// `None` for an empty sequence.
pub fn ambiguity_ratio(seq: &[u8]) -> Option<f64> {
    if seq.is_empty() {
        return None;
    }
    let ambiguous = seq.iter().filter(|&&b| !is_canonical(b)).count();
    Some(ambiguous as f64 / seq.len() as f64)
}

/// True when the ambiguity ratio is at most `max_ambig` (inclusive).
/// An empty sequence is never high quality.
pub fn is_high_quality(seq: &[u8], max_ambig: f64) -> bool {
    ambiguity_ratio(seq).is_some_and(|ratio| ratio <= max_ambig)
}

/// Upper-case and delete every symbol not in {A,C,G,T}.
/// Removed symbols are dropped, not masked, so the result may be shorter.
pub fn clean(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(u8::to_ascii_uppercase)
        .filter(|&b| is_canonical(b))
        .collect()
}

/// Deterministic content hash of a cleaned sequence (hex MD5)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an already-cleaned sequence. Case is normalised first so
    /// callers holding lower-case residues get the same hash.
    pub fn of(cleaned: &[u8]) -> Self {
        let upper = cleaned.to_ascii_uppercase();
        Fingerprint(format!("{:x}", md5::compute(&upper)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of running one raw sequence through the normaliser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    LowQuality,
    TooShort { cleaned_len: usize },
    Accepted { cleaned: Vec<u8>, fingerprint: Fingerprint },
}

/// Quality gate applied to every candidate record
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    pub max_ambig: f64,
    pub min_len: usize,
}

impl Normalizer {
    pub fn new(max_ambig: f64, min_len: usize) -> Self {
        Self { max_ambig, min_len }
    }

    pub fn normalize(&self, raw: &[u8]) -> Normalized {
        if !is_high_quality(raw, self.max_ambig) {
            return Normalized::LowQuality;
        }

        let cleaned = clean(raw);
        if cleaned.len() < self.min_len {
            return Normalized::TooShort {
                cleaned_len: cleaned.len(),
            };
        }

        let fingerprint = Fingerprint::of(&cleaned);
        Normalized::Accepted {
            cleaned,
            fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_strips_non_acgt() {
        assert_eq!(clean(b"acgtNNRYacgt-*"), b"ACGTACGT");
        assert_eq!(clean(b""), b"");
        assert_eq!(clean(b"NNNN"), b"");
    }

    #[test]
    fn test_quality_boundary_is_inclusive() {
        let mut seq = vec![b'A'; 95];
        seq.extend_from_slice(b"NNNNN");
        assert!(is_high_quality(&seq, 0.05));

        seq[0] = b'N';
        assert!(!is_high_quality(&seq, 0.05));
    }

    #[test]
    fn test_quality_is_case_insensitive() {
        assert!(is_high_quality(b"acgtacgt", 0.0));
        assert!(!is_high_quality(b"acgn", 0.0));
    }

    #[test]
    fn test_empty_sequence_is_low_quality() {
        assert!(!is_high_quality(b"", 1.0));
        assert_eq!(ambiguity_ratio(b""), None);
    }

    #[test]
    fn test_fingerprint_ignores_case() {
        assert_eq!(Fingerprint::of(b"acgt"), Fingerprint::of(b"ACGT"));
        assert_ne!(Fingerprint::of(b"ACGT"), Fingerprint::of(b"ACGA"));

        let hex = Fingerprint::of(b"ACGT");
        assert_eq!(hex.as_str().len(), 32);
        assert!(hex.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_normalizer_policy_order() {
        let normalizer = Normalizer::new(0.05, 10);

        // Too noisy on the raw sequence even though cleaning would rescue it
        assert_eq!(normalizer.normalize(b"ACGTACGTACGTNN"), Normalized::LowQuality);

        // Clean, but short after cleaning
        assert_eq!(
            normalizer.normalize(b"ACGTACGT"),
            Normalized::TooShort { cleaned_len: 8 }
        );

        match normalizer.normalize(b"acgtacgtacgtacgtacgtn") {
            Normalized::Accepted { cleaned, fingerprint } => {
                assert_eq!(cleaned, b"ACGTACGTACGTACGTACGT");
                assert_eq!(fingerprint, Fingerprint::of(b"ACGTACGTACGTACGTACGT"));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(seq in proptest::collection::vec(any::<u8>(), 0..512)) {
            let once = clean(&seq);
            prop_assert_eq!(clean(&once), once);
        }

        #[test]
        fn prop_cleaned_is_never_longer(seq in "[ACGTNacgtnRY-]{0,256}") {
            prop_assert!(clean(seq.as_bytes()).len() <= seq.len());
        }

        #[test]
        fn prop_noisy_sequences_fail(good in 1usize..200, bad in 1usize..200) {
            let mut seq = vec![b'A'; good];
            seq.extend(std::iter::repeat(b'N').take(bad));
            let ratio = bad as f64 / (good + bad) as f64;
            let threshold = 0.05;
            prop_assert_eq!(is_high_quality(&seq, threshold), ratio <= threshold);
        }
    }
}
