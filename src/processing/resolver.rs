//! Cross-split near-duplicate removal
//!
//! Runs on the written output after every split is finished. For each
//! (reference, query) pair in [`Split::LEAKAGE_PAIRS`] all reference files are
//! sketched in one batch, then every query file is sketched on its own and
//! deleted as soon as one reference lies within the threshold. Deletions hit
//! the query side only, so train keeps priority and val/test are compared
//! against each other only after both were checked against train.

use crate::processing::manifest::ManifestRow;
use crate::processing::split::Split;
use crate::processing::stats::{Counter, RunStats};
use crate::tools::traits::SketchTool;
use anyhow::Context;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output files grouped by split, in write order
pub type SplitFiles = BTreeMap<Split, Vec<PathBuf>>;

/// Group manifest rows by split
pub fn split_files_from_manifest(rows: &[ManifestRow]) -> SplitFiles {
    let mut files = SplitFiles::new();
    for row in rows {
        files.entry(row.split).or_default().push(row.path.clone());
    }
    files
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovedFile {
    pub path: PathBuf,
    pub split: Split,
    pub reference_split: Split,
    pub reference: String,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    pub removed: Vec<RemovedFile>,
    pub pairs_compared: usize,
    /// The sketch tool was missing; leakage was not checked at all
    pub skipped_unavailable: bool,
    /// The pass stopped early on a tool failure; earlier removals stand
    pub aborted: Option<String>,
}

impl ResolutionReport {
    pub fn removed_paths(&self) -> HashSet<PathBuf> {
        self.removed.iter().map(|r| r.path.clone()).collect()
    }

    pub fn is_complete(&self) -> bool {
        !self.skipped_unavailable && self.aborted.is_none()
    }
}

pub struct NearDuplicateResolver<'a, T: SketchTool + ?Sized> {
    tool: &'a mut T,
    threshold: f64,
    work_dir: PathBuf,
}

fn existing_files(files: &SplitFiles, split: Split) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    files
        .get(&split)
        .map(|paths| {
            paths
                .iter()
                .filter(|p| p.is_file() && seen.insert((*p).clone()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn remove_sketch(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!("Could not remove sketch {}: {}", path.display(), e);
    }
}

impl<'a, T: SketchTool + ?Sized> NearDuplicateResolver<'a, T> {
    /// `work_dir` holds temporary sketches; it is created on demand
    pub fn new(tool: &'a mut T, threshold: f64, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            threshold,
            work_dir: work_dir.into(),
        }
    }

    /// Remove query-side files within `threshold` of any reference file.
    ///
    /// A missing tool skips the whole pass; a tool failure stops it. Neither
    /// is returned as an error: the report records what happened and any
    /// removals made before the failure stay in place.
    pub fn resolve(&mut self, files: &SplitFiles, stats: &mut RunStats) -> ResolutionReport {
        let mut report = ResolutionReport::default();

        if !self.tool.is_available() {
            warn!(
                "{} not found. Skipping near-duplicate removal; cross-split leakage is not checked.",
                self.tool.name()
            );
            report.skipped_unavailable = true;
            return report;
        }

        match self.tool.version() {
            Ok(version) => debug!("{} version: {}", self.tool.name(), version),
            Err(e) => debug!("Could not query {} version: {}", self.tool.name(), e),
        }
        info!(
            "Starting near-duplicate removal with {} (threshold {})",
            self.tool.name(),
            self.threshold
        );

        for (reference, query) in Split::LEAKAGE_PAIRS {
            if let Err(e) = self.resolve_pair(reference, query, files, stats, &mut report) {
                warn!(
                    "Near-duplicate removal aborted at {} vs {}: {:#}",
                    reference, query, e
                );
                report.aborted = Some(format!("{:#}", e));
                break;
            }
        }

        info!(
            "Near-duplicate removal finished: {} files removed",
            report.removed.len()
        );
        report
    }

    fn resolve_pair(
        &mut self,
        reference_split: Split,
        query_split: Split,
        files: &SplitFiles,
        stats: &mut RunStats,
        report: &mut ResolutionReport,
    ) -> anyhow::Result<()> {
        let references = existing_files(files, reference_split);
        let queries = existing_files(files, query_split);

        if references.is_empty() || queries.is_empty() {
            debug!(
                "Skipping {} vs {}: {} reference and {} query files",
                reference_split,
                query_split,
                references.len(),
                queries.len()
            );
            return Ok(());
        }

        fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("Failed to create {}", self.work_dir.display()))?;

        info!(
            "Comparing {} {} files against {} {} files",
            queries.len(),
            query_split,
            references.len(),
            reference_split
        );

        let reference_sketch = self
            .tool
            .build_sketch(
                &references,
                &self.work_dir.join(format!("mash_{}", reference_split)),
            )
            .with_context(|| format!("Failed to sketch {} files", reference_split))?;
        report.pairs_compared += 1;

        let result = self.scan_queries(
            &reference_sketch,
            reference_split,
            query_split,
            &queries,
            stats,
            report,
        );
        remove_sketch(&reference_sketch);
        result
    }

    fn scan_queries(
        &mut self,
        reference_sketch: &Path,
        reference_split: Split,
        query_split: Split,
        queries: &[PathBuf],
        stats: &mut RunStats,
        report: &mut ResolutionReport,
    ) -> anyhow::Result<()> {
        let query_prefix = self.work_dir.join("query");

        for query in queries {
            if !query.is_file() {
                continue;
            }

            let query_sketch = self
                .tool
                .build_sketch(std::slice::from_ref(query), &query_prefix)
                .with_context(|| format!("Failed to sketch {}", query.display()))?;
            let distances = self
                .tool
                .distance(reference_sketch, &query_sketch)
                .with_context(|| format!("Failed to compute distances for {}", query.display()));
            remove_sketch(&query_sketch);
            let distances = distances?;

            // First reference within the threshold decides; no global minimum
            if let Some(hit) = distances.iter().find(|d| d.distance <= self.threshold) {
                warn!(
                    "Near-duplicate ({:.4}): removing {} (matches {} in {})",
                    hit.distance,
                    query.display(),
                    hit.reference,
                    reference_split
                );
                fs::remove_file(query)
                    .with_context(|| format!("Failed to remove {}", query.display()))?;
                stats.increment(Counter::SkippedMashDuplicate);
                report.removed.push(RemovedFile {
                    path: query.clone(),
                    split: query_split,
                    reference_split,
                    reference: hit.reference.clone(),
                    distance: hit.distance,
                });
            }
        }

        Ok(())
    }
}
