use crate::core::config::MashConfig;
use crate::processing::manifest::{prune_manifest, read_manifest};
use crate::processing::resolver::{split_files_from_manifest, NearDuplicateResolver};
use crate::processing::stats::{Counter, RunStats};
use crate::tools::mash::MashTool;
use crate::tools::traits::SketchTool;
use crate::utils::output::{info, section_header, success, tree_item, warning};
use crate::utils::progress::create_spinner;
use crate::MetadatasetError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct DedupArgs {
    /// Output directory of a previous curate run
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Category whose manifest lists the files to check
    #[arg(long)]
    pub category: String,

    /// Sketch distance at or below which a file counts as a near-duplicate
    #[arg(long, default_value = "0.05")]
    pub mash_threshold: f64,

    /// Drop manifest rows for removed files
    #[arg(long)]
    pub prune_manifest: bool,

    /// Path to the mash binary
    #[arg(long, value_name = "FILE", env = "METADATASET_MASH")]
    pub mash_binary: Option<PathBuf>,
}

pub fn run(args: DedupArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.mash_threshold) {
        return Err(MetadatasetError::Config(format!(
            "mash_threshold must be within [0, 1], got {}",
            args.mash_threshold
        ))
        .into());
    }

    let meta_dir = args.out_dir.join("metadata");
    let manifest_path = meta_dir.join(format!("{}_manifest.csv", args.category));
    if !manifest_path.exists() {
        anyhow::bail!("Manifest not found: {}", manifest_path.display());
    }

    let mut tool = match &args.mash_binary {
        Some(path) if path.is_file() => MashTool::with_binary(path),
        Some(path) => {
            return Err(MetadatasetError::Tool(format!(
                "mash binary not found: {}",
                path.display()
            ))
            .into())
        }
        None => MashTool::from_config(&MashConfig::default()),
    };
    if !tool.is_available() {
        return Err(MetadatasetError::Tool("mash is not installed or not on PATH".to_string()).into());
    }

    let rows = read_manifest(&manifest_path)?;
    let files = split_files_from_manifest(&rows);
    info(&format!("Loaded {} manifest rows", rows.len()));

    let spinner = create_spinner("Comparing splits with mash...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    let mut stats = RunStats::new();
    let report = NearDuplicateResolver::new(&mut tool, args.mash_threshold, &meta_dir)
        .resolve(&files, &mut stats);
    spinner.finish_and_clear();

    section_header("Near-duplicate Removal");
    tree_item(false, "Split pairs compared", Some(&report.pairs_compared.to_string()));
    tree_item(
        true,
        Counter::SkippedMashDuplicate.name(),
        Some(&stats.get(Counter::SkippedMashDuplicate).to_string()),
    );

    if let Some(reason) = &report.aborted {
        warning(&format!("Stopped early: {}", reason));
    }

    if args.prune_manifest && !report.removed.is_empty() {
        let pruned = prune_manifest(&manifest_path, &report.removed_paths())?;
        success(&format!("Pruned {} manifest rows", pruned));
    } else if !report.removed.is_empty() {
        warning("Manifest still lists the removed files (use --prune-manifest)");
    }

    Ok(())
}
