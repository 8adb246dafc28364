//! Command-line interface definitions.
//!
//! Every option has a default, so running the binary with no arguments polls
//! the built-in sources and writes `real_jobs.json` in the working directory.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Built-in sources, default output path
/// job_snapshot
///
/// # Custom source list and output location
/// job_snapshot --config sources.yaml --output site/data/jobs.json
///
/// # Quiet run: no copy-paste block on stdout
/// job_snapshot --no-echo
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON snapshot to write
    #[arg(short, long, env = "JOBS_OUTPUT", default_value = "real_jobs.json")]
    pub output: PathBuf,

    /// Optional YAML file replacing the built-in source list
    #[arg(short, long, env = "JOBS_SOURCES")]
    pub config: Option<PathBuf>,

    /// Number of jobs listed in the console preview
    #[arg(long, default_value_t = 20)]
    pub preview: usize,

    /// Do not print the copy-paste JSON block to stdout
    #[arg(long)]
    pub no_echo: bool,
}
