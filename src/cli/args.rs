//! Command line argument definitions.

use crate::config::BoundPolicy;
use crate::CheckCategory;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    Json,
    /// JUnit XML for CI systems
    Junit,
}

/// Sanity checks for detector-hit datasets
#[derive(Parser, Debug)]
#[command(name = "hit-validate")]
#[command(about = "Validate detector-hit datasets against the reference pixel geometry")]
#[command(
    after_help = "EXIT CODES:\n    0   All checks passed\n    1   One or more checks failed\n    2   Invalid arguments\n    3   Runtime error"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run validation checks over a dataset
    Check(CheckArgs),
    /// List all available checks
    List,
    /// Print version information
    Version,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Flattened per-hit table to validate
    pub dataset: PathBuf,

    /// Run only this check (repeatable)
    #[arg(long, value_name = "ID")]
    pub only: Vec<String>,

    /// Skip this check (repeatable)
    #[arg(long, value_name = "ID")]
    pub skip: Vec<String>,

    /// Run only checks in this category (repeatable)
    #[arg(long, value_enum)]
    pub category: Vec<CheckCategory>,

    /// Pixel barrel geometry table (default: built-in table)
    #[arg(long, value_name = "FILE")]
    pub barrel: Option<PathBuf>,

    /// Pixel endcap geometry table (default: built-in table)
    #[arg(long, value_name = "FILE")]
    pub endcap: Option<PathBuf>,

    /// Load configuration from TOML file
    #[arg(long, value_name = "FILE", env = "HIT_VALIDATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Field delimiter of the dataset
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Minimum hits per event, exclusive
    #[arg(long, value_name = "N")]
    pub min_hits: Option<i64>,

    /// How hit positions are compared against the geometry
    #[arg(long, value_enum)]
    pub bound_policy: Option<BoundPolicy>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "HIT_VALIDATE_FORMAT")]
    pub format: OutputFormat,

    /// Only output failures
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Include failure details and timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Run checks on parallel threads
    #[arg(long)]
    pub parallel: bool,

    /// Stop on first failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl CheckArgs {
    /// Color is used unless `--no-color` is given or `NO_COLOR` is set.
    pub fn color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}
