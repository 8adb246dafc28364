//! Google Careers search endpoint.
//!
//! `GET https://careers.google.com/api/v3/search/?q=<query>&location=<loc>&page=1`
//! returns one page of results:
//!
//! ```json
//! {"jobs": [{"id": "jobs/123", "title": "..", "company_name": "Google",
//!            "locations": [{"display": "Bengaluru, Karnataka, India"}],
//!            "apply_url": "https://careers.google.com/jobs/results/123/"}]}
//! ```
//!
//! Only the first page is read.

use super::{SourceAdapter, apply_location_filter, decode_items, json_type, resolve_link};
use crate::config::{GoogleCareersSearch, RequestPolicy};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::{JobPosting, LOCATION_UNSPECIFIED};
use async_trait::async_trait;
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://careers.google.com";
const DEFAULT_COMPANY: &str = "Google";

#[derive(Debug, Deserialize)]
struct GoogleJob {
    id: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    #[serde(default)]
    locations: Vec<GoogleLocation>,
    apply_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    display: Option<String>,
}

#[derive(Debug)]
pub struct GoogleCareersAdapter {
    search: GoogleCareersSearch,
    name: String,
    base_url: String,
}

impl GoogleCareersAdapter {
    pub fn new(search: GoogleCareersSearch) -> Self {
        let name = format!("google-careers:{}", search.query);
        Self {
            search,
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

    fn search_url(&self) -> Result<Url, FetchError> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = format!(
            "{base}/api/v3/search/?q={}&page=1",
            urlencoding::encode(&self.search.query)
        );
        if let Some(location) = &self.search.location {
            url.push_str("&location=");
            url.push_str(&urlencoding::encode(location));
        }
        Ok(Url::parse(&url)?)
    }
}

#[async_trait]
impl SourceAdapter for GoogleCareersAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> &RequestPolicy {
        &self.search.policy
    }

    #[instrument(level = "info", skip_all, fields(source = %self.name))]
    async fn fetch(&self, http: &HttpClient) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.search_url()?;
        let body = http.get_text(&url, &self.search.policy).await?;
        let base = Url::parse(&self.base_url)?;
        let postings = parse_search(&self.name, &body, &base)?;
        let postings = apply_location_filter(&self.name, postings, &self.search.location_filter);
        info!(count = postings.len(), "Parsed Google Careers results");
        Ok(postings)
    }
}

/// Map a search result page to postings. Relative links resolve against `base`.
pub(crate) fn parse_search(
    source: &str,
    body: &str,
    base: &Url,
) -> Result<Vec<JobPosting>, FetchError> {
    let mut root = match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => map,
        other => {
            return Err(FetchError::Shape(format!(
                "expected a search result object, got {}",
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

    let postings = decode_items::<GoogleJob>(source, items)
        .into_iter()
        .map(|job| {
            let location = job
                .locations
                .iter()
                .filter_map(|l| l.display.as_deref())
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .join("; ");
            let link = job_link(source, &job, base);
            JobPosting::new(
                job.title.as_deref(),
                job.company_name.as_deref().unwrap_or(DEFAULT_COMPANY),
                Some(location.as_str()),
                LOCATION_UNSPECIFIED,
                link.as_deref(),
            )
        })
        .collect();
    Ok(postings)
}

/// `apply_url` when present, otherwise the results page derived from `jobs/<n>`.
fn job_link(source: &str, job: &GoogleJob, base: &Url) -> Option<String> {
    match (&job.apply_url, &job.id) {
        (Some(apply), _) if !apply.trim().is_empty() => resolve_link(source, base, apply),
        (_, Some(id)) => {
            let number = id.rsplit('/').next().unwrap_or(id);
            resolve_link(source, base, &format!("/jobs/results/{number}/"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationFilter;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    fn search(location_filter: LocationFilter) -> GoogleCareersSearch {
        GoogleCareersSearch {
            query: "software engineer".to_string(),
            location: Some("India".to_string()),
            location_filter,
            policy: RequestPolicy {
                timeout_ms: 2_000,
                delay_ms: 0,
                user_agent: None,
            },
        }
    }

    #[test]
    fn test_parse_search() {
        let body = r#"{"count": 2, "jobs": [
            {"id": "jobs/1234", "title": "Software Engineer III", "company_name": "Google",
             "locations": [{"display": "Bengaluru, Karnataka, India"}, {"display": "Hyderabad, Telangana, India"}],
             "apply_url": "https://careers.google.com/jobs/results/1234/"},
            {"id": "jobs/5678", "title": "SRE", "locations": []}
        ]}"#;
        let postings = parse_search("google:test", body, &base()).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(
            postings[0].location,
            "Bengaluru, Karnataka, India; Hyderabad, Telangana, India"
        );
        assert_eq!(postings[0].link, "https://careers.google.com/jobs/results/1234/");
        assert_eq!(postings[1].company, "Google");
        assert_eq!(postings[1].location, LOCATION_UNSPECIFIED);
        assert_eq!(postings[1].link, "https://careers.google.com/jobs/results/5678/");
    }

    #[test]
    fn test_relative_apply_url_is_resolved() {
        let body = r#"{"jobs": [{"title": "PM", "apply_url": "/jobs/results/9/"}]}"#;
        let postings = parse_search("google:test", body, &base()).unwrap();
        assert_eq!(postings[0].link, "https://careers.google.com/jobs/results/9/");
    }

    #[test]
    fn test_no_link_information() {
        let body = r#"{"jobs": [{"title": "PM"}]}"#;
        let postings = parse_search("google:test", body, &base()).unwrap();
        assert_eq!(postings[0].link, "#");
    }

    #[test]
    fn test_parse_wrong_shape() {
        let err = parse_search("google:test", "[1, 2]", &base()).unwrap_err();
        assert!(matches!(err, FetchError::Shape(_)));
    }

    #[test]
    fn test_search_url_encodes_parameters() {
        let mut search = search(LocationFilter::default());
        search.location = Some("New York, NY".to_string());
        let url = GoogleCareersAdapter::new(search).search_url().unwrap();
        assert_eq!(url.host_str(), Some("careers.google.com"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("q".to_string(), "software engineer".to_string())));
        assert!(pairs.contains(&("location".to_string(), "New York, NY".to_string())));
        assert!(pairs.contains(&("page".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_filters_locations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/search/"))
            .and(query_param("q", "software engineer"))
            .and(query_param("location", "India"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"jobs": [
                    {"id": "jobs/1", "title": "SWE", "locations": [{"display": "Bengaluru, India"}]},
                    {"id": "jobs/2", "title": "SRE", "locations": [{"display": "Zurich, Switzerland"}]},
                    {"id": "jobs/3", "title": "PM", "locations": [{"display": "Remote"}]}
                ]}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = GoogleCareersAdapter::new(search(LocationFilter::new(["India", "Remote"])))
            .with_base_url(server.uri());
        let postings = adapter.fetch(&HttpClient::new().unwrap()).await.unwrap();

        let titles: Vec<&str> = postings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["SWE", "PM"]);
        assert_eq!(postings[0].link, format!("{}/jobs/results/1/", server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let adapter =
            GoogleCareersAdapter::new(search(LocationFilter::default())).with_base_url(server.uri());
        let err = adapter.fetch(&HttpClient::new().unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 429, .. }));
        assert_eq!(err.kind(), "status");
    }
}
