//! Greenhouse job board API.
//!
//! `GET https://boards-api.greenhouse.io/v1/boards/<token>/jobs` answers with
//! `{"jobs": [{"title": .., "location": {"name": ..}, "absolute_url": ..}]}`.
//! An empty or absent `jobs` list is a valid result. Relative `absolute_url`
//! values resolve against the public board at `https://boards.greenhouse.io/`.

use super::{SourceAdapter, apply_location_filter, decode_items, json_type, resolve_link};
use crate::config::{GreenhouseBoard, RequestPolicy};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::{JobPosting, LOCATION_UNSPECIFIED};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://boards-api.greenhouse.io";
const BOARD_BASE_URL: &str = "https://boards.greenhouse.io/";

#[derive(Debug, Deserialize)]
struct GreenhouseJob {
    title: Option<String>,
    location: Option<GreenhouseLocation>,
    absolute_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseLocation {
    name: Option<String>,
}

#[derive(Debug)]
pub struct GreenhouseAdapter {
    board: GreenhouseBoard,
    name: String,
    base_url: String,
}

impl GreenhouseAdapter {
    pub fn new(board: GreenhouseBoard) -> Self {
        let name = format!("greenhouse:{}", board.board_token);
        Self {
            board,
            name,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a local server.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn jobs_url(&self) -> Result<Url, FetchError> {
        let base = self.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/v1/boards/{}/jobs",
            urlencoding::encode(&self.board.board_token)
        ))?)
    }
}

#[async_trait]
impl SourceAdapter for GreenhouseAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> &RequestPolicy {
        &self.board.policy
    }

    #[instrument(level = "info", skip_all, fields(source = %self.name))]
    async fn fetch(&self, http: &HttpClient) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.jobs_url()?;
        let body = http.get_text(&url, &self.board.policy).await?;
        let postings = parse_jobs(&self.name, &body, &self.board.company_name)?;
        let postings = apply_location_filter(&self.name, postings, &self.board.location_filter);
        info!(count = postings.len(), "Parsed Greenhouse jobs");
        Ok(postings)
    }
}

/// Map a Greenhouse response body to postings.
pub(crate) fn parse_jobs(
    source: &str,
    body: &str,
    company: &str,
) -> Result<Vec<JobPosting>, FetchError> {
    let mut root = match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => map,
        other => {
            return Err(FetchError::Shape(format!(
                "expected an object with a `jobs` list, got {}",
                json_type(&other)
            )));
        }
    };

    let items = match root.remove("jobs") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(FetchError::Shape(format!(
                "`jobs` should be an array, got {}",
                json_type(&other)
            )));
        }
    };
    let board_base = Url::parse(BOARD_BASE_URL)?;

    let postings = decode_items::<GreenhouseJob>(source, items)
        .into_iter()
        .map(|job| {
            let location = job.location.and_then(|l| l.name);
            let link = job
                .absolute_url
                .as_deref()
                .and_then(|raw| resolve_link(source, &board_base, raw));
            JobPosting::new(
                job.title.as_deref(),
                company,
                location.as_deref(),
                LOCATION_UNSPECIFIED,
                link.as_deref(),
            )
        })
        .collect();
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationFilter;
    use crate::models::NO_LINK;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn board() -> GreenhouseBoard {
        GreenhouseBoard {
            board_token: "coinbase".to_string(),
            company_name: "Coinbase".to_string(),
            location_filter: LocationFilter::default(),
            policy: RequestPolicy {
                timeout_ms: 2_000,
                delay_ms: 0,
                user_agent: None,
            },
        }
    }

    #[test]
    fn test_parse_empty_jobs_is_ok() {
        let postings = parse_jobs("greenhouse:test", r#"{"jobs": []}"#, "Coinbase").unwrap();
        assert!(postings.is_empty());
    }

    #[test]
    fn test_parse_missing_jobs_key_is_ok() {
        let postings = parse_jobs("greenhouse:test", r#"{"meta": {"total": 0}}"#, "Coinbase").unwrap();
        assert!(postings.is_empty());
    }

    #[test]
    fn test_parse_jobs() {
        let body = r#"{"jobs": [
            {"id": 1, "title": "Security Engineer", "location": {"name": "Remote - USA"}, "absolute_url": "https://boards.greenhouse.io/coinbase/jobs/1"},
            {"id": 2, "title": "Data Analyst", "location": null}
        ]}"#;
        let postings = parse_jobs("greenhouse:test", body, "Coinbase").unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "Security Engineer");
        assert_eq!(postings[0].location, "Remote - USA");
        assert_eq!(postings[0].company, "Coinbase");
        assert_eq!(postings[0].link, "https://boards.greenhouse.io/coinbase/jobs/1");
        assert_eq!(postings[1].location, LOCATION_UNSPECIFIED);
        assert_eq!(postings[1].link, NO_LINK);
    }

    #[test]
    fn test_parse_resolves_relative_absolute_url() {
        let body = r#"{"jobs": [{"title": "SE", "absolute_url": "/coinbase/jobs/1"}, {"title": "PM", "absolute_url": ""}]}"#;
        let postings = parse_jobs("greenhouse:test", body, "Coinbase").unwrap();
        assert_eq!(postings[0].link, "https://boards.greenhouse.io/coinbase/jobs/1");
        assert_eq!(postings[1].link, NO_LINK);
    }

    #[test]
    fn test_parse_wrong_shapes() {
        assert!(matches!(
            parse_jobs("greenhouse:test", "[]", "X").unwrap_err(),
            FetchError::Shape(_)
        ));
        assert!(matches!(
            parse_jobs("greenhouse:test", r#"{"jobs": "none"}"#, "X").unwrap_err(),
            FetchError::Shape(_)
        ));
    }

    #[test]
    fn test_jobs_url() {
        let adapter = GreenhouseAdapter::new(board());
        assert_eq!(
            adapter.jobs_url().unwrap().as_str(),
            "https://boards-api.greenhouse.io/v1/boards/coinbase/jobs"
        );
    }

    async fn board_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/boards/coinbase/jobs"))
            .respond_with(ResponseTemplate::new(status).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_fetch_empty_board() {
        let server = board_server(200, r#"{"jobs": []}"#).await;
        let adapter = GreenhouseAdapter::new(board()).with_base_url(server.uri());
        let postings = adapter.fetch(&HttpClient::new().unwrap()).await.unwrap();
        assert!(postings.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_status_error() {
        let server = board_server(404, r#"{"status": 404}"#).await;
        let adapter = GreenhouseAdapter::new(board()).with_base_url(server.uri());
        let err = adapter.fetch(&HttpClient::new().unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
