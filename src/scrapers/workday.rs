//! Workday external career sites.
//!
//! The CXS search endpoint only accepts `POST`:
//!
//! ```text
//! POST https://<host>/wday/cxs/<tenant>/<site>/jobs
//! {"appliedFacets": {}, "limit": 20, "offset": 0, "searchText": ""}
//! ```
//!
//! and answers `{"total": N, "jobPostings": [{"title", "externalPath", "locationsText"}]}`.
//! `externalPath` is relative to the public site at `https://<host>/en-US/<site>/`.

use super::{SourceAdapter, apply_location_filter, decode_items, json_type, resolve_link};
use crate::config::{RequestPolicy, WorkdaySite};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::{JobPosting, LOCATION_UNSPECIFIED};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    applied_facets: serde_json::Map<String, Value>,
    limit: u32,
    offset: u32,
    search_text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkdayPosting {
    title: Option<String>,
    external_path: Option<String>,
    locations_text: Option<String>,
}

#[derive(Debug)]
pub struct WorkdayAdapter {
    site: WorkdaySite,
    name: String,
    scheme: &'static str,
}

impl WorkdayAdapter {
    pub fn new(site: WorkdaySite) -> Self {
        let name = format!("workday:{}/{}", site.tenant, site.site);
        Self {
            site,
            name,
            scheme: "https",
        }
    }

    /// Talk plain HTTP to `host` (used by tests against a local server).
    #[cfg(test)]
    fn insecure(mut self) -> Self {
        self.scheme = "http";
        self
    }

    fn search_url(&self) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!(
            "{}://{}/wday/cxs/{}/{}/jobs",
            self.scheme,
            self.site.host,
            urlencoding::encode(&self.site.tenant),
            urlencoding::encode(&self.site.site)
        ))?)
    }

    /// Public site root; the trailing slash keeps `<site>` when joining.
    fn site_url(&self) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!(
            "{}://{}/en-US/{}/",
            self.scheme,
            self.site.host,
            urlencoding::encode(&self.site.site)
        ))?)
    }
}

#[async_trait]
impl SourceAdapter for WorkdayAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> &RequestPolicy {
        &self.site.policy
    }

    #[instrument(level = "info", skip_all, fields(source = %self.name))]
    async fn fetch(&self, http: &HttpClient) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.search_url()?;
        let request = SearchRequest {
            applied_facets: serde_json::Map::new(),
            limit: self.site.limit,
            offset: 0,
            search_text: &self.site.search_text,
        };
        let body = http.post_json_text(&url, &request, &self.site.policy).await?;
        let site_url = self.site_url()?;
        let postings = parse_postings(&self.name, &body, &self.site.company_name, &site_url)?;
        let postings = apply_location_filter(&self.name, postings, &self.site.location_filter);
        info!(count = postings.len(), "Parsed Workday postings");
        Ok(postings)
    }
}

/// Map a CXS search response to postings, resolving `externalPath` against `site`.
pub(crate) fn parse_postings(
    source: &str,
    body: &str,
    company: &str,
    site: &Url,
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
    let items = match root.remove("jobPostings") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(FetchError::Shape(format!(
                "`jobPostings` should be an array, got {}",
                json_type(&other)
            )));
        }
    };

    let postings = decode_items::<WorkdayPosting>(source, items)
        .into_iter()
        .map(|p| {
            // externalPath starts with `/job/...`; strip it so the join stays under the site.
            let link = p
                .external_path
                .as_deref()
                .and_then(|path| resolve_link(source, site, path.trim_start_matches('/')));
            JobPosting::new(
                p.title.as_deref(),
                company,
                p.locations_text.as_deref(),
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
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn site(host: &str) -> WorkdaySite {
        WorkdaySite {
            company_name: "NVIDIA".to_string(),
            host: host.to_string(),
            tenant: "nvidia".to_string(),
            site: "NVIDIAExternalCareerSite".to_string(),
            search_text: String::new(),
            limit: 20,
            location_filter: LocationFilter::default(),
            policy: RequestPolicy {
                timeout_ms: 2_000,
                delay_ms: 0,
                user_agent: None,
            },
        }
    }

    #[test]
    fn test_urls() {
        let adapter = WorkdayAdapter::new(site("nvidia.wd5.myworkdayjobs.com"));
        assert_eq!(
            adapter.search_url().unwrap().as_str(),
            "https://nvidia.wd5.myworkdayjobs.com/wday/cxs/nvidia/NVIDIAExternalCareerSite/jobs"
        );
        assert_eq!(
            adapter.site_url().unwrap().as_str(),
            "https://nvidia.wd5.myworkdayjobs.com/en-US/NVIDIAExternalCareerSite/"
        );
    }

    #[test]
    fn test_urls_encode_path_segments() {
        let mut s = site("acme.wd1.myworkdayjobs.com");
        s.tenant = "acme corp".to_string();
        s.site = "External/Careers".to_string();
        let adapter = WorkdayAdapter::new(s);
        assert_eq!(
            adapter.search_url().unwrap().as_str(),
            "https://acme.wd1.myworkdayjobs.com/wday/cxs/acme%20corp/External%2FCareers/jobs"
        );
        assert_eq!(
            adapter.site_url().unwrap().as_str(),
            "https://acme.wd1.myworkdayjobs.com/en-US/External%2FCareers/"
        );
    }

    #[test]
    fn test_parse_resolves_external_path() {
        let adapter = WorkdayAdapter::new(site("nvidia.wd5.myworkdayjobs.com"));
        let body = r#"{"total": 2, "jobPostings": [
            {"title": "Senior GPU Architect", "externalPath": "/job/India-Bengaluru/Senior-GPU-Architect_JR1", "locationsText": "India, Bengaluru", "postedOn": "Posted Today"},
            {"title": "Intern"}
        ]}"#;
        let postings =
            parse_postings("workday:test", body, "NVIDIA", &adapter.site_url().unwrap()).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(
            postings[0].link,
            "https://nvidia.wd5.myworkdayjobs.com/en-US/NVIDIAExternalCareerSite/job/India-Bengaluru/Senior-GPU-Architect_JR1"
        );
        assert_eq!(postings[0].location, "India, Bengaluru");
        assert_eq!(postings[1].location, LOCATION_UNSPECIFIED);
        assert_eq!(postings[1].link, "#");
    }

    #[test]
    fn test_parse_missing_postings_is_empty() {
        let site = Url::parse("https://x.example/en-US/site/").unwrap();
        let postings = parse_postings("workday:test", r#"{"total": 0}"#, "X", &site).unwrap();
        assert!(postings.is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let request = SearchRequest {
            applied_facets: serde_json::Map::new(),
            limit: 20,
            offset: 0,
            search_text: "engineer",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"appliedFacets": {}, "limit": 20, "offset": 0, "searchText": "engineer"})
        );
    }

    #[tokio::test]
    async fn test_fetch_posts_search_body_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wday/cxs/nvidia/NVIDIAExternalCareerSite/jobs"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "appliedFacets": {},
                "limit": 20,
                "offset": 0,
                "searchText": "gpu"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"total": 1, "jobPostings": [{"title": "Engineer", "externalPath": "/job/Remote/Engineer_1", "locationsText": "Remote"}]}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let mut s = site(&server.address().to_string());
        s.search_text = "gpu".to_string();
        let adapter = WorkdayAdapter::new(s).insecure();

        let postings = adapter.fetch(&HttpClient::new().unwrap()).await.unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Engineer");
        assert_eq!(
            postings[0].link,
            format!(
                "{}/en-US/NVIDIAExternalCareerSite/job/Remote/Engineer_1",
                server.uri()
            )
        );
    }
}
