//! Source adapters: one module per job-board kind.
//!
//! Every adapter implements [`SourceAdapter`]: a single fetch-and-normalize
//! operation returning owned [`JobPosting`]s or a [`FetchError`]. Adapters are
//! independent of each other and hold only their own board configuration.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Lever | [`lever`] | JSON API | Flat array, `categories.location` |
//! | Greenhouse | [`greenhouse`] | JSON API | `{"jobs": [...]}`, `location.name` |
//! | Google Careers | [`google`] | JSON API | Single search page |
//! | Workday | [`workday`] | JSON API (POST) | CXS search endpoint |
//! | HTML listing page | [`html`] | HTML scraping | Selectors from config |
//!
//! [`registry`] turns a [`SourcesConfig`] into the ordered adapter list the
//! aggregator runs.

use crate::config::{LocationFilter, RequestPolicy, SourcesConfig};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::JobPosting;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

pub mod google;
pub mod greenhouse;
pub mod html;
pub mod lever;
pub mod workday;

/// One configured job source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Identity used in logs and run reports, e.g. `lever:stripe`.
    fn name(&self) -> &str;

    /// Timeout, delay and User-Agent applied to this source's requests.
    fn policy(&self) -> &RequestPolicy;

    /// Perform the network fetch and normalize the response.
    async fn fetch(&self, http: &HttpClient) -> Result<Vec<JobPosting>, FetchError>;
}

/// Build the adapters for every configured board, in a fixed order:
/// Lever, Greenhouse, Google Careers, Workday, HTML pages.
pub fn registry(config: &SourcesConfig) -> Vec<Box<dyn SourceAdapter>> {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(config.board_count());

    adapters.extend(
        config
            .lever
            .iter()
            .cloned()
            .map(|b| Box::new(lever::LeverAdapter::new(b)) as Box<dyn SourceAdapter>),
    );
    adapters.extend(
        config
            .greenhouse
            .iter()
            .cloned()
            .map(|b| Box::new(greenhouse::GreenhouseAdapter::new(b)) as Box<dyn SourceAdapter>),
    );
    adapters.extend(
        config
            .google_careers
            .iter()
            .cloned()
            .map(|s| Box::new(google::GoogleCareersAdapter::new(s)) as Box<dyn SourceAdapter>),
    );
    adapters.extend(
        config
            .workday
            .iter()
            .cloned()
            .map(|s| Box::new(workday::WorkdayAdapter::new(s)) as Box<dyn SourceAdapter>),
    );
    adapters.extend(
        config
            .html
            .iter()
            .cloned()
            .map(|b| Box::new(html::HtmlBoardAdapter::new(b)) as Box<dyn SourceAdapter>),
    );

    adapters
}

/// Drop postings whose location does not pass `filter`.
pub(crate) fn apply_location_filter(
    source: &str,
    postings: Vec<JobPosting>,
    filter: &LocationFilter,
) -> Vec<JobPosting> {
    if filter.is_empty() {
        return postings;
    }
    let before = postings.len();
    let kept: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| filter.matches(&p.location))
        .collect();
    debug!(source, before, after = kept.len(), "Applied location filter");
    kept
}

/// Deserialize each element on its own, skipping the ones that do not fit.
pub(crate) fn decode_items<T: DeserializeOwned>(source: &str, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(source, index, error = %e, "Skipping malformed item");
                None
            }
        })
        .collect()
}

/// Resolve a possibly relative link against `base`.
///
/// Blank links and links that cannot be joined give `None`, which the
/// posting turns into the placeholder link.
pub(crate) fn resolve_link(source: &str, base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match base.join(raw) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!(source, link = %raw, error = %e, "Could not resolve job link");
            None
        }
    }
}

/// Short JSON type name for shape diagnostics.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
