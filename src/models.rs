//! Data models for job listings.
//!
//! - [`JobPosting`]: one normalized listing as returned by a source adapter
//! - [`Job`]: a posting after aggregation, carrying its run-local id and the
//!   capture date
//!
//! `Job` is the record the static display page consumes, so its JSON shape is
//! fixed: every field is always present and `postedDate` keeps its camelCase
//! key.

use serde::{Deserialize, Serialize};

/// Placeholder title when a source omits one.
pub const NO_TITLE: &str = "No title";
/// Default location for API-backed sources.
pub const LOCATION_UNSPECIFIED: &str = "Not specified";
/// Default for fields an HTML card does not carry.
pub const NOT_AVAILABLE: &str = "N/A";
/// Link used when a source gives no URL at all.
pub const NO_LINK: &str = "#";

/// A normalized job listing produced by a source adapter.
///
/// Built only through [`JobPosting::new`], which substitutes defaults so that
/// no field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
}

impl JobPosting {
    /// Normalize raw field values into a posting.
    ///
    /// Blank or missing values fall back to [`NO_TITLE`], `location_default`
    /// and [`NO_LINK`]; the description is synthesized from title and company.
    /// All values are trimmed.
    pub fn new(
        title: Option<&str>,
        company: &str,
        location: Option<&str>,
        location_default: &str,
        link: Option<&str>,
    ) -> Self {
        let title = non_blank(title).unwrap_or(NO_TITLE).to_string();
        let company = non_blank(Some(company)).unwrap_or(NOT_AVAILABLE).to_string();
        let location = non_blank(location).unwrap_or(location_default).to_string();
        let link = non_blank(link).unwrap_or(NO_LINK).to_string();
        let description = summary_for(&title, &company);

        Self {
            title,
            company,
            location,
            description,
            link,
        }
    }

    /// Append extra context (e.g. the hiring team) to the synthesized description.
    pub fn with_detail(mut self, label: &str, value: Option<&str>) -> Self {
        if let Some(value) = non_blank(value) {
            self.description = format!("{} {}: {}.", self.description, label, value);
        }
        self
    }
}

/// A job record as written to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// 1-based, dense within one run.
    pub id: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
    /// Capture date of the run in `YYYY-MM-DD` format.
    #[serde(rename = "postedDate")]
    pub posted_date: String,
}

impl Job {
    pub fn from_posting(id: u32, posting: JobPosting, posted_date: &str) -> Self {
        Self {
            id,
            title: posting.title,
            company: posting.company,
            location: posting.location,
            description: posting.description,
            link: posting.link,
            posted_date: posted_date.to_string(),
        }
    }
}

fn summary_for(title: &str, company: &str) -> String {
    format!("Job listing summary for {title} at {company}. Check link for details.")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
