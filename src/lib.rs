pub mod bio;
pub mod cli;
pub mod core;
pub mod processing;
pub mod tools;
pub mod utils;

pub use crate::core::config::PipelineConfig;
pub use crate::processing::curator::{CurationReport, Curator};
pub use crate::processing::resolver::NearDuplicateResolver;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MetadatasetError>;
