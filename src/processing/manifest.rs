//! Append-only CSV manifest of every record written by a run
//!
//! The manifest reflects what was kept at write time. Files removed later by
//! the near-duplicate pass keep their rows unless [`prune_manifest`] is run.

use crate::bio::classify::{ClassLabel, RepliconType};
use crate::processing::split::Split;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const MANIFEST_COLUMNS: [&str; 9] = [
    "split",
    "category",
    "class4",
    "replicon_type",
    "host_assembly",
    "accession",
    "description",
    "path",
    "source_file",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub split: Split,
    pub category: String,
    pub class4: ClassLabel,
    pub replicon_type: RepliconType,
    pub host_assembly: String,
    pub accession: String,
    pub description: String,
    pub path: PathBuf,
    pub source_file: PathBuf,
}

pub struct ManifestWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl ManifestWriter {
    /// Create (or truncate) a manifest and write its header row
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(MANIFEST_COLUMNS)?;

        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn append(&mut self, row: &ManifestRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }
}

pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<ManifestRow>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Rewrite a manifest without the rows whose `path` is in `removed`.
/// Returns the number of rows dropped.
pub fn prune_manifest<P: AsRef<Path>>(path: P, removed: &HashSet<PathBuf>) -> Result<usize> {
    let path = path.as_ref();
    let rows = read_manifest(path)?;
    let before = rows.len();

    let mut writer = ManifestWriter::create(path)?;
    for row in rows.iter().filter(|r| !removed.contains(&r.path)) {
        writer.append(row)?;
    }
    let kept = writer.rows();
    writer.finish()?;

    Ok(before - kept)
}
