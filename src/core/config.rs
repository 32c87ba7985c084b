use crate::MetadatasetError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one curation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Root of the raw tree laid out as `<split>/<category>/*`
    #[serde(default)]
    pub base_dir: PathBuf,
    /// Root of the curated output tree
    #[serde(default)]
    pub out_dir: PathBuf,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    #[serde(default = "default_max_ambig")]
    pub max_ambig: f64,
    #[serde(default = "default_mash_threshold")]
    pub mash_threshold: f64,
    #[serde(default)]
    pub keep_unknown: bool,
    /// Drop manifest rows for files removed by the near-duplicate pass
    #[serde(default)]
    pub prune_manifest: bool,
    #[serde(default)]
    pub mash: MashConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MashConfig {
    /// Explicit path to the `mash` binary; looked up on PATH when unset
    #[serde(default)]
    pub binary: Option<PathBuf>,
    #[serde(default = "default_kmer_size")]
    pub kmer_size: u32,
    #[serde(default = "default_sketch_size")]
    pub sketch_size: u32,
    /// Threads passed to `mash` (0 = all available)
    #[serde(default)]
    pub threads: usize,
}

fn default_min_len() -> usize {
    1000
}

fn default_max_ambig() -> f64 {
    0.05
}

fn default_mash_threshold() -> f64 {
    0.05
}

fn default_kmer_size() -> u32 {
    21
}

fn default_sketch_size() -> u32 {
    1000
}

impl Default for MashConfig {
    fn default() -> Self {
        Self {
            binary: None,
            kmer_size: default_kmer_size(),
            sketch_size: default_sketch_size(),
            threads: 0,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::new(),
            out_dir: PathBuf::new(),
            category: String::new(),
            min_len: default_min_len(),
            max_ambig: default_max_ambig(),
            mash_threshold: default_mash_threshold(),
            keep_unknown: false,
            prune_manifest: false,
            mash: MashConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            out_dir: out_dir.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.out_dir.join("metadata")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.metadata_dir()
            .join(format!("{}_manifest.csv", self.category))
    }

    pub fn host_map_path(&self) -> PathBuf {
        self.metadata_dir()
            .join(format!("{}_host_map.json", self.category))
    }

    pub fn validate(&self) -> Result<(), MetadatasetError> {
        if self.category.trim().is_empty() {
            return Err(MetadatasetError::Config("category must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.max_ambig) {
            return Err(MetadatasetError::Config(format!(
                "max_ambig must be within [0, 1], got {}",
                self.max_ambig
            )));
        }
        if !(0.0..=1.0).contains(&self.mash_threshold) {
            return Err(MetadatasetError::Config(format!(
                "mash_threshold must be within [0, 1], got {}",
                self.mash_threshold
            )));
        }
        if self.mash.kmer_size == 0 || self.mash.kmer_size > 32 {
            return Err(MetadatasetError::Config(format!(
                "mash.kmer_size must be within 1..=32, got {}",
                self.mash.kmer_size
            )));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, MetadatasetError> {
    let contents = std::fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&contents)
        .map_err(|e| MetadatasetError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<(), MetadatasetError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| MetadatasetError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_len, 1000);
        assert_eq!(config.max_ambig, 0.05);
        assert_eq!(config.mash_threshold, 0.05);
        assert!(!config.keep_unknown);
        assert!(!config.prune_manifest);
        assert_eq!(config.mash.kmer_size, 21);
        assert_eq!(config.mash.sketch_size, 1000);
        assert_eq!(config.mash.binary, None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_dir = "/data/raw"
out_dir = "/data/curated"
category = "bacteria"
min_len = 500

[mash]
kmer_size = 16
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/data/raw"));
        assert_eq!(config.category, "bacteria");
        assert_eq!(config.min_len, 500);
        assert_eq!(config.max_ambig, 0.05);
        assert_eq!(config.mash.kmer_size, 16);
        assert_eq!(config.mash.sketch_size, 1000);
    }

    #[test]
    fn test_save_and_reload() {
        let file = NamedTempFile::new().unwrap();
        let mut config = PipelineConfig::new("raw", "out", "fungi");
        config.keep_unknown = true;
        config.mash.binary = Some(PathBuf::from("/opt/mash/bin/mash"));

        save_config(file.path(), &config).unwrap();
        assert_eq!(load_config(file.path()).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "min_len = \"lots\"").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(MetadatasetError::Config(_))
        ));
    }

    #[test]
    fn test_validate() {
        let config = PipelineConfig::new("raw", "out", "bacteria");
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.category = " ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.max_ambig = 1.5;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.mash_threshold = -0.1;
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.mash.kmer_size = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_metadata_paths() {
        let config = PipelineConfig::new("raw", "out", "bacteria");
        assert_eq!(
            config.manifest_path(),
            PathBuf::from("out/metadata/bacteria_manifest.csv")
        );
        assert_eq!(
            config.host_map_path(),
            PathBuf::from("out/metadata/bacteria_host_map.json")
        );
    }
}
