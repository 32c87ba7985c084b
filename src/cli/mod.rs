pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "metadataset",
    version,
    about = "Curate per-split genomic FASTA collections for model training",
    long_about = "metadataset cleans, deduplicates and classifies raw train/val/test FASTA \
                  collections into a canonical per-class layout with a CSV manifest and a \
                  host-assembly map, then removes near-duplicate files that leak across splits."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Curate a raw split tree into the output layout
    Curate(commands::curate::CurateArgs),

    /// Re-run cross-split near-duplicate removal on an existing output tree
    Dedup(commands::dedup::DedupArgs),

    /// Print or write the default configuration
    Config(commands::config::ConfigArgs),
}
