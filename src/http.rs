//! Thin HTTP layer shared by all source adapters.
//!
//! [`HttpClient`] applies a board's [`RequestPolicy`] to every request: the
//! fixed pre-request delay, the per-request timeout and the optional
//! User-Agent override. Error statuses and timeouts are turned into
//! [`FetchError`] variants so adapters only deal with bodies.

use crate::config::RequestPolicy;
use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::{Client, RequestBuilder, redirect::Policy};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, FetchError> {
        let inner = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .redirect(Policy::limited(8))
            .build()?;
        Ok(Self { inner })
    }

    /// `GET` a URL and return the body text.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_text(&self, url: &Url, policy: &RequestPolicy) -> Result<String, FetchError> {
        let request = self.inner.get(url.clone());
        self.send(request, url, policy).await
    }

    /// `POST` a JSON body and return the response text.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn post_json_text<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        policy: &RequestPolicy,
    ) -> Result<String, FetchError> {
        let request = self.inner.post(url.clone()).json(body);
        self.send(request, url, policy).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &Url,
        policy: &RequestPolicy,
    ) -> Result<String, FetchError> {
        if !policy.delay().is_zero() {
            debug!(delay = ?policy.delay(), "Sleeping before request");
            tokio::time::sleep(policy.delay()).await;
        }

        let mut request = request.timeout(policy.timeout());
        if let Some(ua) = &policy.user_agent {
            request = request.header(reqwest::header::USER_AGENT, ua);
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(policy.timeout())
            } else {
                FetchError::Network(e)
            }
        };

        let response = request.send().await.map_err(map_err)?;
        let status = response.status();
        debug!(%status, "Received response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %truncate_for_log(&body, 300), "Error response body");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(map_err)?;
        debug!(bytes = body.len(), "Read response body");
        Ok(body)
    }
}
