//! Lever postings API.
//!
//! `GET https://api.lever.co/v0/postings/<company>?mode=json` returns a flat
//! JSON array of postings:
//!
//! ```json
//! [{"text": "Engineer", "categories": {"location": "Remote", "team": "Infra"}, "hostedUrl": "https://jobs.lever.co/x/1"}]
//! ```
//!
//! `hostedUrl` is normally absolute; relative values resolve against the
//! public board at `https://jobs.lever.co/`.

use super::{SourceAdapter, apply_location_filter, decode_items, json_type, resolve_link};
use crate::config::{LeverBoard, RequestPolicy};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::{JobPosting, LOCATION_UNSPECIFIED};
use crate::utils::upcase;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.lever.co";
const HOSTED_BASE_URL: &str = "https://jobs.lever.co/";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    text: Option<String>,
    categories: Option<LeverCategories>,
    hosted_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeverCategories {
    location: Option<String>,
    team: Option<String>,
}

#[derive(Debug)]
pub struct LeverAdapter {
    board: LeverBoard,
    name: String,
    company_name: String,
    base_url: String,
}

impl LeverAdapter {
    pub fn new(board: LeverBoard) -> Self {
        let name = format!("lever:{}", board.company);
        let company_name = board
            .display_name
            .clone()
            .unwrap_or_else(|| upcase(&board.company));
        Self {
            board,
            name,
            company_name,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a local server.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn postings_url(&self) -> Result<Url, FetchError> {
        let base = self.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/v0/postings/{}?mode=json",
            urlencoding::encode(&self.board.company)
        ))?)
    }
}

#[async_trait]
impl SourceAdapter for LeverAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> &RequestPolicy {
        &self.board.policy
    }

    #[instrument(level = "info", skip_all, fields(source = %self.name))]
    async fn fetch(&self, http: &HttpClient) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.postings_url()?;
        let body = http.get_text(&url, &self.board.policy).await?;
        let postings = parse_postings(&self.name, &body, &self.company_name)?;
        let postings = apply_location_filter(&self.name, postings, &self.board.location_filter);
        info!(count = postings.len(), "Parsed Lever postings");
        Ok(postings)
    }
}

/// Map a Lever response body to postings.
pub(crate) fn parse_postings(
    source: &str,
    body: &str,
    company: &str,
) -> Result<Vec<JobPosting>, FetchError> {
    let items = match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items,
        other => {
            return Err(FetchError::Shape(format!(
                "expected a JSON array of postings, got {}",
                json_type(&other)
            )));
        }
    };
    let hosted_base = Url::parse(HOSTED_BASE_URL)?;

    let postings = decode_items::<LeverPosting>(source, items)
        .into_iter()
        .map(|p| {
            let categories = p.categories.unwrap_or_default();
            let link = p
                .hosted_url
                .as_deref()
                .and_then(|raw| resolve_link(source, &hosted_base, raw));
            JobPosting::new(
                p.text.as_deref(),
                company,
                categories.location.as_deref(),
                LOCATION_UNSPECIFIED,
                link.as_deref(),
            )
            .with_detail("Team", categories.team.as_deref())
        })
        .collect();
    Ok(postings)
}
