//! Shared fixtures for curation tests
//!
//! Builds raw `<split>/<category>/` trees in a temporary directory and
//! generates deterministic nucleotide sequences.

#![allow(dead_code)]

use metadataset::PipelineConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Raw input tree plus an output directory, removed on drop
pub struct RawTree {
    _dir: TempDir,
    pub base: PathBuf,
    pub out: PathBuf,
}

impl RawTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let base = dir.path().join("raw");
        let out = dir.path().join("curated");
        fs::create_dir_all(&base).expect("Failed to create raw dir");

        RawTree {
            _dir: dir,
            base,
            out,
        }
    }

    fn input_dir(&self, split: &str, category: &str) -> PathBuf {
        let dir = self.base.join(split).join(category);
        fs::create_dir_all(&dir).expect("Failed to create split dir");
        dir
    }

    /// Write a plain FASTA file from (header, sequence) pairs
    pub fn write_fasta(
        &self,
        split: &str,
        category: &str,
        name: &str,
        records: &[(&str, &str)],
    ) -> PathBuf {
        let path = self.input_dir(split, category).join(name);
        fs::write(&path, fasta_text(records)).expect("Failed to write FASTA");
        path
    }

    /// Write a gzip-compressed FASTA file
    pub fn write_fasta_gz(
        &self,
        split: &str,
        category: &str,
        name: &str,
        records: &[(&str, &str)],
    ) -> PathBuf {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let path = self.input_dir(split, category).join(name);
        let file = fs::File::create(&path).expect("Failed to create gz file");
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(fasta_text(records).as_bytes())
            .expect("Failed to write gz FASTA");
        encoder.finish().expect("Failed to finish gz stream");
        path
    }

    pub fn write_raw(&self, split: &str, category: &str, name: &str, contents: &str) -> PathBuf {
        let path = self.input_dir(split, category).join(name);
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    pub fn config(&self, category: &str) -> PipelineConfig {
        PipelineConfig::new(&self.base, &self.out, category)
    }

    pub fn out_path(&self, relative: &str) -> PathBuf {
        self.out.join(relative)
    }
}

pub fn fasta_text(records: &[(&str, &str)]) -> String {
    let mut text = String::new();
    for (header, sequence) in records {
        text.push('>');
        text.push_str(header);
        text.push('\n');
        for chunk in sequence.as_bytes().chunks(70) {
            text.push_str(std::str::from_utf8(chunk).unwrap());
            text.push('\n');
        }
    }
    text
}

/// Deterministic pseudo-random ACGT sequence; different seeds differ
pub fn random_acgt(len: usize, seed: u64) -> String {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 33) as usize % 4] as char
        })
        .collect()
}

/// `valid` ACGT bases followed by `ambiguous` N symbols
pub fn with_ambiguous(valid: usize, ambiguous: usize, seed: u64) -> String {
    let mut seq = random_acgt(valid, seed);
    seq.push_str(&"N".repeat(ambiguous));
    seq
}

pub fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).filter(|e| e.path().is_file()).count())
        .unwrap_or(0)
}
