use clap::Parser;
use colored::*;
use metadataset::cli::{Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then METADATASET_LOG, then the verbosity flag
    let default_level = if cli.verbose > 0 { "debug" } else { "info" };
    let log_level =
        std::env::var("METADATASET_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<metadataset::MetadatasetError>() {
            Some(metadataset::MetadatasetError::Config(_)) => 2,
            Some(metadataset::MetadatasetError::Io(_)) => 3,
            Some(metadataset::MetadatasetError::Parse(_))
            | Some(metadataset::MetadatasetError::Csv(_))
            | Some(metadataset::MetadatasetError::Json(_)) => 4,
            Some(metadataset::MetadatasetError::Tool(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Curate(args) => metadataset::cli::commands::curate::run(args),
        Commands::Dedup(args) => metadataset::cli::commands::dedup::run(args),
        Commands::Config(args) => metadataset::cli::commands::config::run(args),
    }
}
