//! Human-readable console output: a short preview of the run and a JSON
//! block meant to be pasted into the static page's data section.

use crate::aggregate::{SourceOutcome, SourceReport};
use crate::models::Job;
use std::fmt::Write;

pub const COPY_BLOCK_START: &str = "--- COPY THIS SECTION INTO index.html ---";
pub const COPY_BLOCK_END: &str = "----------------------------------------";

/// First `limit` jobs, two lines each, followed by the total.
pub fn preview(jobs: &[Job], limit: usize) -> String {
    let mut out = String::new();
    for job in jobs.iter().take(limit) {
        writeln!(out, "{} - {} ({})", job.company, job.title, job.location).unwrap();
        writeln!(out, "Apply: {}\n", job.link).unwrap();
    }
    writeln!(out, "Total jobs collected: {}", jobs.len()).unwrap();
    out
}

/// One line per source: how many postings it gave or why it failed.
pub fn source_summary(reports: &[SourceReport]) -> String {
    let mut out = String::new();
    for report in reports {
        match &report.outcome {
            SourceOutcome::Fetched(count) => {
                writeln!(out, "  {:<40} {count} jobs", report.source).unwrap();
            }
            SourceOutcome::Failed { kind, reason } => {
                writeln!(out, "  {:<40} FAILED ({kind}): {reason}", report.source).unwrap();
            }
        }
    }
    out
}

/// Wrap rendered JSON in the copy-paste delimiters.
pub fn copy_block(rendered_json: &str) -> String {
    format!("\n\n{COPY_BLOCK_START}\n{rendered_json}\n{COPY_BLOCK_END}\n")
}
