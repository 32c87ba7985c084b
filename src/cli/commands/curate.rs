use crate::core::config::{load_config, PipelineConfig};
use crate::processing::curator::{CurationReport, Curator};
use crate::processing::stats::Counter;
use crate::utils::output::{format_number, section_header, success, tree_item, warning};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct CurateArgs {
    /// TOML configuration file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Raw dataset directory laid out as <split>/<category>/
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Output directory for curated records and metadata
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Genome category (e.g. bacteria, archaea, fungi, protozoa, viral)
    #[arg(long)]
    pub category: Option<String>,

    /// Minimum sequence length after cleaning
    #[arg(long)]
    pub min_len: Option<usize>,

    /// Maximum fraction of non-ACGT symbols
    #[arg(long)]
    pub max_ambig: Option<f64>,

    /// Sketch distance at or below which a file counts as a near-duplicate
    #[arg(long)]
    pub mash_threshold: Option<f64>,

    /// Keep records whose class cannot be determined
    #[arg(long)]
    pub keep_unknown: bool,

    /// Drop manifest rows for files removed as near-duplicates
    #[arg(long)]
    pub prune_manifest: bool,

    /// Skip the near-duplicate pass
    #[arg(long)]
    pub no_mash: bool,

    /// Path to the mash binary
    #[arg(long, value_name = "FILE", env = "METADATASET_MASH")]
    pub mash_binary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl CurateArgs {
    /// Merge the config file (if any) with command-line overrides
    pub fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.base_dir {
            config.base_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.out_dir = dir.clone();
        }
        if let Some(category) = &self.category {
            config.category = category.clone();
        }
        if let Some(min_len) = self.min_len {
            config.min_len = min_len;
        }
        if let Some(max_ambig) = self.max_ambig {
            config.max_ambig = max_ambig;
        }
        if let Some(threshold) = self.mash_threshold {
            config.mash_threshold = threshold;
        }
        if let Some(binary) = &self.mash_binary {
            config.mash.binary = Some(binary.clone());
        }
        config.keep_unknown |= self.keep_unknown;
        config.prune_manifest |= self.prune_manifest;

        if config.base_dir.as_os_str().is_empty() {
            anyhow::bail!("--base-dir is required (or set base_dir in the config file)");
        }
        if config.out_dir.as_os_str().is_empty() {
            anyhow::bail!("--out-dir is required (or set out_dir in the config file)");
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: CurateArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;

    let mut curator = Curator::new(config)?.with_progress(!args.quiet);
    if args.no_mash {
        curator = curator.without_near_duplicate_pass();
    }

    let report = curator.run()?;
    print_summary(&report);
    Ok(())
}

pub fn print_summary(report: &CurationReport) {
    section_header("Curation Summary");

    let stats = &report.stats;
    for (counter, count) in stats.iter().filter(|(c, _)| *c != Counter::RecordsWritten) {
        tree_item(false, counter.name(), Some(&format_number(count)));
    }
    tree_item(
        true,
        Counter::RecordsWritten.name(),
        Some(&format_number(stats.get(Counter::RecordsWritten))),
    );

    println!();
    println!("Manifest: {}", report.manifest_path.display());
    println!("Host map: {}", report.host_map_path.display());

    match &report.resolution {
        Some(resolution) if resolution.skipped_unavailable => {
            warning("mash not found: near-duplicate leakage between splits was NOT removed");
        }
        Some(resolution) if resolution.aborted.is_some() => {
            warning(&format!(
                "Near-duplicate removal stopped early: {}",
                resolution.aborted.as_deref().unwrap_or_default()
            ));
        }
        Some(resolution) => {
            if !resolution.removed.is_empty() && report.manifest_rows_pruned == 0 {
                warning(&format!(
                    "{} manifest rows refer to removed near-duplicate files (use --prune-manifest)",
                    resolution.removed.len()
                ));
            }
        }
        None => warning("Near-duplicate removal was disabled"),
    }

    success(&format!(
        "Curated {} records",
        format_number(stats.get(Counter::RecordsWritten))
    ));
}
