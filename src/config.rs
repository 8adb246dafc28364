//! Source configuration.
//!
//! [`SourcesConfig::builtin`] carries the boards this tool has always polled;
//! the derived `Default` polls nothing. A YAML file with the same structure
//! replaces the built-in list wholesale when passed with `--config`:
//!
//! ```yaml
//! lever:
//!   - company: stripe
//! greenhouse:
//!   - board_token: coinbase
//!     company_name: Coinbase
//! html:
//!   - name: studentscircles
//!     url: https://studentscircles.com/jobs/
//!     card_selector: 'div[data-test="JobCard"]'
//!     title_selector: a.styles_title_
//!     policy:
//!       timeout_ms: 15000
//!       delay_ms: 3000
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// User-Agent sent to HTML pages, which commonly reject library clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Timeout, politeness delay and User-Agent for one board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestPolicy {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Fixed sleep before each request, in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
    /// Overrides the client's default User-Agent.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl RequestPolicy {
    /// JSON APIs: 10 s timeout, no delay.
    pub fn api() -> Self {
        Self {
            timeout_ms: 10_000,
            delay_ms: 0,
            user_agent: None,
        }
    }

    /// HTML pages: 15 s timeout, 3 s delay, browser User-Agent.
    pub fn html() -> Self {
        Self {
            timeout_ms: 15_000,
            delay_ms: 3_000,
            user_agent: Some(BROWSER_USER_AGENT.to_string()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Case-insensitive substring filter on the location field.
///
/// An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LocationFilter(Vec<String>);

impl LocationFilter {
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(needles.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, location: &str) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let location = location.to_lowercase();
        self.0
            .iter()
            .any(|needle| location.contains(&needle.to_lowercase()))
    }
}

/// One Lever company board.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeverBoard {
    /// Lever account slug, as in `api.lever.co/v0/postings/<company>`.
    pub company: String,
    /// Name written to the `company` field; defaults to the capitalized slug.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub location_filter: LocationFilter,
    #[serde(default = "RequestPolicy::api")]
    pub policy: RequestPolicy,
}

/// One Greenhouse job board.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GreenhouseBoard {
    pub board_token: String,
    pub company_name: String,
    #[serde(default)]
    pub location_filter: LocationFilter,
    #[serde(default = "RequestPolicy::api")]
    pub policy: RequestPolicy,
}

/// One Google Careers search.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleCareersSearch {
    pub query: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_filter: LocationFilter,
    #[serde(default = "RequestPolicy::api")]
    pub policy: RequestPolicy,
}

/// One Workday external career site.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkdaySite {
    pub company_name: String,
    /// e.g. `nvidia.wd5.myworkdayjobs.com`
    pub host: String,
    pub tenant: String,
    pub site: String,
    #[serde(default)]
    pub search_text: String,
    #[serde(default = "default_workday_limit")]
    pub limit: u32,
    #[serde(default)]
    pub location_filter: LocationFilter,
    #[serde(default = "RequestPolicy::api")]
    pub policy: RequestPolicy,
}

/// One HTML listing page scraped with CSS selectors.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HtmlBoard {
    /// Label used in logs.
    pub name: String,
    pub url: String,
    /// Base for relative links; defaults to `url`.
    #[serde(default)]
    pub base_url: Option<String>,
    pub card_selector: String,
    pub title_selector: String,
    #[serde(default)]
    pub company_selector: Option<String>,
    #[serde(default)]
    pub location_selector: Option<String>,
    /// Element carrying the `href`; defaults to the title element.
    #[serde(default)]
    pub link_selector: Option<String>,
    /// Company used when a card has none.
    #[serde(default)]
    pub company_fallback: Option<String>,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub location_filter: LocationFilter,
    #[serde(default = "RequestPolicy::html")]
    pub policy: RequestPolicy,
}

fn default_workday_limit() -> u32 {
    20
}

fn default_max_items() -> usize {
    50
}

/// Every board polled in one run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub lever: Vec<LeverBoard>,
    pub greenhouse: Vec<GreenhouseBoard>,
    pub google_careers: Vec<GoogleCareersSearch>,
    pub workday: Vec<WorkdaySite>,
    pub html: Vec<HtmlBoard>,
}

impl SourcesConfig {
    /// The boards compiled into the binary.
    pub fn builtin() -> Self {
        let lever = ["stripe", "netflix", "shopify", "dropbox", "robinhood"]
            .into_iter()
            .map(|company| LeverBoard {
                company: company.to_string(),
                display_name: None,
                location_filter: LocationFilter::default(),
                policy: RequestPolicy::api(),
            })
            .collect();

        let greenhouse = [
            ("coinbase", "Coinbase"),
            ("twilio", "Twilio"),
            ("datadog", "Datadog"),
            ("palantir", "Palantir"),
            ("airbnb", "Airbnb"),
        ]
        .into_iter()
        .map(|(token, name)| GreenhouseBoard {
            board_token: token.to_string(),
            company_name: name.to_string(),
            location_filter: LocationFilter::default(),
            policy: RequestPolicy::api(),
        })
        .collect();

        let google_careers = vec![GoogleCareersSearch {
            query: "software engineer".to_string(),
            location: Some("India".to_string()),
            location_filter: LocationFilter::new(["India", "Remote"]),
            policy: RequestPolicy::api(),
        }];

        let workday = vec![WorkdaySite {
            company_name: "NVIDIA".to_string(),
            host: "nvidia.wd5.myworkdayjobs.com".to_string(),
            tenant: "nvidia".to_string(),
            site: "NVIDIAExternalCareerSite".to_string(),
            search_text: String::new(),
            limit: default_workday_limit(),
            location_filter: LocationFilter::new(["India", "Remote"]),
            policy: RequestPolicy::api(),
        }];

        let html = vec![HtmlBoard {
            name: "studentscircles".to_string(),
            url: "https://studentscircles.com/jobs/".to_string(),
            base_url: None,
            card_selector: r#"div[data-test="JobCard"]"#.to_string(),
            title_selector: "a.styles_title_".to_string(),
            company_selector: Some("a.styles_companyName".to_string()),
            location_selector: Some("div.styles_location".to_string()),
            link_selector: None,
            company_fallback: None,
            max_items: default_max_items(),
            location_filter: LocationFilter::default(),
            policy: RequestPolicy::html(),
        }];

        Self {
            lever,
            greenhouse,
            google_careers,
            workday,
            html,
        }
    }

    /// Parse a YAML source list.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load from `path` when given, otherwise use [`SourcesConfig::builtin`].
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("reading {}: {e}", path.display()))?;
                Self::from_yaml(&text).map_err(|e| format!("parsing {}: {e}", path.display()))?
            }
            None => Self::builtin(),
        };
        info!(boards = config.board_count(), "Loaded source configuration");
        Ok(config)
    }

    pub fn board_count(&self) -> usize {
        self.lever.len()
            + self.greenhouse.len()
            + self.google_careers.len()
            + self.workday.len()
            + self.html.len()
    }
}
