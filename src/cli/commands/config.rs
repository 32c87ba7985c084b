use crate::core::config::{save_config, PipelineConfig};
use crate::utils::output::success;
use crate::MetadatasetError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default configuration here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::default();

    match args.output {
        Some(path) => {
            save_config(&path, &config)?;
            success(&format!("Wrote default configuration to {}", path.display()));
        }
        None => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| MetadatasetError::Config(format!("Failed to serialize config: {}", e)))?;
            print!("{}", text);
        }
    }

    Ok(())
}
