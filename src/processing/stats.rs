use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named run counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    FilesProcessed,
    FilesFailed,
    RecordsSeen,
    SkippedUnknownClass,
    SkippedLowQuality,
    SkippedShort,
    SkippedDuplicateMd5,
    SkippedMashDuplicate,
    RecordsWritten,
}

impl Counter {
    pub const ALL: [Counter; 9] = [
        Counter::FilesProcessed,
        Counter::FilesFailed,
        Counter::RecordsSeen,
        Counter::SkippedUnknownClass,
        Counter::SkippedLowQuality,
        Counter::SkippedShort,
        Counter::SkippedDuplicateMd5,
        Counter::SkippedMashDuplicate,
        Counter::RecordsWritten,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Counter::FilesProcessed => "files_processed",
            Counter::FilesFailed => "files_failed",
            Counter::RecordsSeen => "records_seen",
            Counter::SkippedUnknownClass => "skipped_unknown_class",
            Counter::SkippedLowQuality => "skipped_low_quality",
            Counter::SkippedShort => "skipped_short",
            Counter::SkippedDuplicateMd5 => "skipped_duplicate_md5",
            Counter::SkippedMashDuplicate => "skipped_mash_duplicate",
            Counter::RecordsWritten => "records_written",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-run counters. Owned by a single driver; reset by constructing a new one.
/// Every counter is present from the start, so summaries list zeros too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunStats {
    counts: BTreeMap<Counter, usize>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            counts: Counter::ALL.into_iter().map(|c| (c, 0)).collect(),
        }
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counter, n: usize) {
        *self.counts.entry(counter).or_insert(0) += n;
    }

    pub fn get(&self, counter: Counter) -> usize {
        self.counts.get(&counter).copied().unwrap_or(0)
    }

    /// All counters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Counter, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }

    /// Total records dropped for any reason before or after writing
    pub fn total_skipped(&self) -> usize {
        [
            Counter::SkippedUnknownClass,
            Counter::SkippedLowQuality,
            Counter::SkippedShort,
            Counter::SkippedDuplicateMd5,
            Counter::SkippedMashDuplicate,
        ]
        .iter()
        .map(|c| self.get(*c))
        .sum()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self.counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_start_at_zero() {
        let stats = RunStats::new();
        assert_eq!(stats.get(Counter::RecordsWritten), 0);
        assert!(stats.iter().all(|(_, n)| n == 0));
    }

    #[test]
    fn test_increment_and_add() {
        let mut stats = RunStats::new();
        stats.increment(Counter::SkippedShort);
        stats.increment(Counter::SkippedShort);
        stats.add(Counter::RecordsWritten, 5);

        assert_eq!(stats.get(Counter::SkippedShort), 2);
        assert_eq!(stats.get(Counter::RecordsWritten), 5);
        assert_eq!(stats.total_skipped(), 2);
    }

    #[test]
    fn test_json_uses_counter_names() {
        let mut stats = RunStats::new();
        stats.increment(Counter::SkippedDuplicateMd5);
        let json: serde_json::Value = serde_json::from_str(&stats.to_json_pretty()).unwrap();
        assert_eq!(json["skipped_duplicate_md5"], 1);
        assert_eq!(json["skipped_short"], 0);
        assert_eq!(json.as_object().unwrap().len(), Counter::ALL.len());
    }

    #[test]
    fn test_iter_follows_declaration_order() {
        let mut stats = RunStats::new();
        stats.increment(Counter::RecordsWritten);
        stats.increment(Counter::FilesProcessed);

        let order: Vec<Counter> = stats.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Counter::ALL);
        assert_eq!(stats.iter().last(), Some((Counter::RecordsWritten, 1)));
    }
}
