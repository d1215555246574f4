pub mod report;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for rtlink
#[derive(Parser, Debug)]
#[command(name = "rtlink")]
#[command(about = "Reconstruct the RT reference tree of a set of DICOM files")]
#[command(version)]
pub struct Cli {
    /// DICOM files or directories (searched recursively)
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Print every series as a root instead of the RT relationship tree
    #[arg(long)]
    pub flat: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Initialises `env_logger`; `verbose` lowers the level to Debug
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
