//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Swap linear appearance lookups for index lookups and add cache invalidation
#[derive(Parser, Debug)]
#[command(name = "indexpatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File to patch in place
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Use specific config file
    #[arg(short = 'C', long = "config", env = "INDEXPATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print a unified diff instead of writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Lines above each return checked for an existing invalidation
    #[arg(long, value_name = "N")]
    pub lookback: Option<usize>,
}
