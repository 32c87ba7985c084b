//! Capability interface for sketch-distance tools
//!
//! The near-duplicate pass only needs two operations, building a sketch over
//! a set of files and computing pairwise distances between two sketches, so
//! a subprocess-backed tool and an in-memory fake can be swapped freely.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// One line of pairwise distance output
#[derive(Debug, Clone, PartialEq)]
pub struct SketchDistance {
    pub reference: String,
    pub query: String,
    pub distance: f64,
    pub p_value: f64,
    pub shared_hashes: String,
}

pub trait SketchTool: Send {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// Whether the tool can be invoked at all
    fn is_available(&self) -> bool;

    /// Build a single sketch covering all `inputs` and return its path.
    /// `output_prefix` is extended with the tool's sketch suffix.
    fn build_sketch(&mut self, inputs: &[PathBuf], output_prefix: &Path) -> Result<PathBuf>;

    /// Distances from every member of `reference` to every member of
    /// `query`, in reference order
    fn distance(&mut self, reference: &Path, query: &Path) -> Result<Vec<SketchDistance>>;

    /// Get tool version
    fn version(&self) -> Result<String>;
}
