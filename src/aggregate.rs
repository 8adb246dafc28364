//! Runs every source adapter once, in order, and merges their postings.
//!
//! Adapters are awaited one after another; a failing adapter contributes no
//! postings but never stops the run. The merged list is re-keyed with dense
//! ids starting at 1 and stamped with the capture date.

use crate::http::HttpClient;
use crate::models::{Job, JobPosting};
use crate::scrapers::SourceAdapter;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument};

/// What happened to one source during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The source answered; the count may be zero.
    Fetched(usize),
    /// The source failed and contributed nothing.
    Failed { kind: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
}

/// Result of one aggregation run.
#[derive(Debug)]
pub struct Aggregation {
    pub jobs: Vec<Job>,
    /// One entry per adapter, in invocation order.
    pub reports: Vec<SourceReport>,
}

impl Aggregation {
    pub fn failed_sources(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed { .. }))
            .count()
    }
}

/// Run `adapters` sequentially and merge what they return.
#[instrument(level = "info", skip_all, fields(sources = adapters.len(), %today))]
pub async fn collect(
    adapters: &[Box<dyn SourceAdapter>],
    http: &HttpClient,
    today: NaiveDate,
) -> Aggregation {
    let results: Vec<(SourceReport, Vec<JobPosting>)> = stream::iter(adapters.iter())
        .then(|adapter| async move { run_source(adapter.as_ref(), http).await })
        .collect()
        .await;

    let (reports, batches): (Vec<_>, Vec<_>) = results.into_iter().unzip();
    let jobs = assemble(batches, today);

    let aggregation = Aggregation { jobs, reports };
    info!(
        total = aggregation.jobs.len(),
        failed_sources = aggregation.failed_sources(),
        "Aggregation complete"
    );
    aggregation
}

async fn run_source(
    adapter: &dyn SourceAdapter,
    http: &HttpClient,
) -> (SourceReport, Vec<JobPosting>) {
    let source = adapter.name().to_string();
    let policy = adapter.policy();
    debug!(%source, timeout = ?policy.timeout(), delay = ?policy.delay(), "Fetching source");
    match adapter.fetch(http).await {
        Ok(postings) => {
            info!(%source, count = postings.len(), "Source fetched");
            let report = SourceReport {
                source,
                outcome: SourceOutcome::Fetched(postings.len()),
            };
            (report, postings)
        }
        Err(e) => {
            error!(%source, kind = e.kind(), error = %e, "Source failed; continuing without it");
            let report = SourceReport {
                source,
                outcome: SourceOutcome::Failed {
                    kind: e.kind(),
                    reason: e.to_string(),
                },
            };
            (report, Vec::new())
        }
    }
}

/// Concatenate batches in order and assign ids `1..=N` and one posting date.
pub fn assemble(batches: Vec<Vec<JobPosting>>, today: NaiveDate) -> Vec<Job> {
    let posted_date = today.format("%Y-%m-%d").to_string();
    batches
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(index, posting)| Job::from_posting(index as u32 + 1, posting, &posted_date))
        .collect()
}
