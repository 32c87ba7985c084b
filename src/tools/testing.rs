//! In-memory sketch tool for tests
//!
//! Distances are looked up by file name from a fixed table, so the resolver's
//! threshold and priority rules can be exercised without a `mash` binary.

use super::mash::sketch_path;
use super::traits::{SketchDistance, SketchTool};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct StaticSketchTool {
    available: bool,
    fail_distance: bool,
    default_distance: f64,
    distances: HashMap<(String, String), f64>,
    sketches: HashMap<PathBuf, Vec<PathBuf>>,
    sketch_calls: usize,
    distance_calls: usize,
}

impl Default for StaticSketchTool {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl StaticSketchTool {
    /// Every pair is maximally distant unless set otherwise
    pub fn new() -> Self {
        Self {
            available: true,
            fail_distance: false,
            default_distance: 1.0,
            distances: HashMap::new(),
            sketches: HashMap::new(),
            sketch_calls: 0,
            distance_calls: 0,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Make every `distance` call fail
    pub fn failing() -> Self {
        Self {
            fail_distance: true,
            ..Self::new()
        }
    }

    /// Set the (symmetric) distance between two files, by file name
    pub fn with_distance(mut self, a: &str, b: &str, distance: f64) -> Self {
        self.distances.insert((a.to_string(), b.to_string()), distance);
        self.distances.insert((b.to_string(), a.to_string()), distance);
        self
    }

    pub fn sketch_calls(&self) -> usize {
        self.sketch_calls
    }

    pub fn distance_calls(&self) -> usize {
        self.distance_calls
    }

    fn lookup(&self, reference: &Path, query: &Path) -> f64 {
        self.distances
            .get(&(file_name(reference), file_name(query)))
            .copied()
            .unwrap_or(self.default_distance)
    }

    fn members(&self, sketch: &Path) -> Result<&[PathBuf]> {
        self.sketches
            .get(sketch)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow::anyhow!("Unknown sketch {}", sketch.display()))
    }
}

impl SketchTool for StaticSketchTool {
    fn name(&self) -> &str {
        "static"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn build_sketch(&mut self, inputs: &[PathBuf], output_prefix: &Path) -> Result<PathBuf> {
        if !self.available {
            anyhow::bail!("static sketch tool disabled");
        }
        self.sketch_calls += 1;
        let sketch = sketch_path(output_prefix);
        self.sketches.insert(sketch.clone(), inputs.to_vec());
        Ok(sketch)
    }

    fn distance(&mut self, reference: &Path, query: &Path) -> Result<Vec<SketchDistance>> {
        self.distance_calls += 1;
        if self.fail_distance {
            anyhow::bail!("static sketch tool configured to fail");
        }

        let references = self.members(reference)?;
        let queries = self.members(query)?;

        let mut out = Vec::with_capacity(references.len() * queries.len());
        for r in references {
            for q in queries {
                out.push(SketchDistance {
                    reference: r.display().to_string(),
                    query: q.display().to_string(),
                    distance: self.lookup(r, q),
                    p_value: 0.0,
                    shared_hashes: String::new(),
                });
            }
        }
        Ok(out)
    }

    fn version(&self) -> Result<String> {
        Ok("StaticSketchTool 1.0.0".to_string())
    }
}
