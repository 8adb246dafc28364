//! # Job Snapshot
//!
//! Polls job-board sources (Lever, Greenhouse, Google Careers, Workday and
//! plain HTML listing pages), normalizes every posting into one record shape
//! and writes the merged list to a JSON file for a static display page.
//!
//! ## Usage
//!
//! ```sh
//! job_snapshot -o real_jobs.json
//! ```
//!
//! ## Architecture
//!
//! A single linear pass:
//! 1. **Configuration**: built-in boards, or a YAML source list
//! 2. **Fetching**: each source adapter runs once, one after another; a failing
//!    source is logged and contributes nothing
//! 3. **Aggregation**: postings are concatenated in source order and given
//!    ids `1..=N` and today's date
//! 4. **Output**: the JSON snapshot on disk, plus a preview and a copy-paste
//!    block on stdout

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod error;
mod http;
mod models;
mod outputs;
mod scrapers;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use config::SourcesConfig;
use http::HttpClient;
use outputs::{console, json};
use utils::{ensure_writable_dir, parent_dir};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("job_snapshot starting up");

    let args = Cli::parse();
    debug!(?args.output, ?args.config, "Parsed CLI arguments");

    // Early check: fail before any network traffic if the snapshot can't be written.
    let output_dir = parent_dir(&args.output);
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let config = SourcesConfig::load(args.config.as_deref())?;
    let adapters = scrapers::registry(&config);
    if adapters.is_empty() {
        warn!("No sources configured; the snapshot will be empty");
    }

    let http = HttpClient::new()?;
    let today = Local::now().date_naive();
    let aggregation = aggregate::collect(&adapters, &http, today).await;

    json::write_jobs(&aggregation.jobs, &args.output).await?;

    print!("{}", console::source_summary(&aggregation.reports));
    println!();
    print!("{}", console::preview(&aggregation.jobs, args.preview));
    println!("\nData saved to {}. Ready for copy-paste.", args.output.display());

    if !args.no_echo {
        let rendered = json::render(&aggregation.jobs)?;
        print!("{}", console::copy_block(&rendered));
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        jobs = aggregation.jobs.len(),
        failed_sources = aggregation.failed_sources(),
        "Execution complete"
    );

    Ok(())
}
