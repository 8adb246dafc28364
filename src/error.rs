//! Error types for the fetch layer.
//!
//! Every source adapter reports failures through [`FetchError`]. The
//! aggregator decides what to do with them; adapters never panic and never
//! abort the run.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching or parsing one source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the board's timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure (DNS, connection refused, reset, TLS, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The body was not valid JSON.
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The body parsed but does not have the expected structure.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// A configured or derived URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A configured CSS selector does not parse.
    #[error("invalid CSS selector `{0}`")]
    Selector(String),
}

impl FetchError {
    /// Coarse classification used in diagnostics.
    ///
    /// * `transport` - the request never produced a response
    /// * `status` - the server rejected the request
    /// * `shape` - the response (or our configuration of it) no longer matches
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) | FetchError::Network(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Json(_)
            | FetchError::Shape(_)
            | FetchError::Url(_)
            | FetchError::Selector(_) => "shape",
        }
    }
}
