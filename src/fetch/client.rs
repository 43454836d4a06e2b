//! Retrying HTTP client for the catalog API and site pages.
//!
//! One request is in flight at a time. Every attempt is traced at debug
//! level before it is sent; failures are classified and retried according to
//! the client's [`BackoffPolicy`].

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, MAX_LOGGED_BODY_BYTES, READ_TIMEOUT_SECS};
use super::error::{DownloadError, FetchError};
use super::retry::{BackoffPolicy, FailureType, RetryDecision, classify_error};
use crate::user_agent;

/// Query parameter that is never written to logs or error messages.
const SECRET_PARAM: &str = "api_key";

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

/// What the caller expects the response body to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Parse the body as JSON (API calls).
    Json,
    /// Return the body as text (site pages).
    Html,
}

impl ResponseFormat {
    fn accept_header(self) -> &'static str {
        match self {
            Self::Json => ACCEPT_JSON,
            Self::Html => ACCEPT_HTML,
        }
    }
}

/// A successfully fetched body.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchBody {
    /// Parsed JSON document.
    Json(Value),
    /// Raw page text.
    Text(String),
}

/// HTTP client that retries with distinct delays for rate limits and other failures.
///
/// Create once and reuse for the whole run to keep connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    policy: BackoffPolicy,
}

impl ApiClient {
    /// Creates a client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self::with_timeouts(policy, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(
        policy: BackoffPolicy,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Self {
        let client = base_client_builder(connect_timeout_secs, read_timeout_secs)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, policy }
    }

    /// Returns the backoff policy in use.
    #[must_use]
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Fetches `url` with `params`, retrying until success or the policy gives up.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if the URL cannot be built (never retried)
    /// - [`FetchError::Decode`] if a 2xx JSON response is malformed (never retried)
    /// - [`FetchError::Exhausted`] once every attempt allowed by the policy failed
    #[instrument(skip(self, params), fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        format: ResponseFormat,
    ) -> Result<FetchBody, FetchError> {
        let request_url = build_url(url, params)?;
        let display_url = redact_url(&request_url);
        let mut attempt: u32 = 1;

        loop {
            let error = match self.attempt(&request_url, &display_url, format).await {
                Ok(body) => return Ok(body),
                Err(error) => error,
            };

            let failure = classify_error(&error);
            match self.policy.should_retry(failure, attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    log_retry(failure, &error, attempt, delay);
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    if failure == FailureType::Permanent {
                        return Err(error);
                    }
                    error!(url = %display_url, attempts = attempt, %reason, "giving up on request");
                    return Err(FetchError::exhausted(display_url, attempt, &error));
                }
            }
        }
    }

    /// Fetches and parses a JSON document.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        match self.fetch(url, params, ResponseFormat::Json).await? {
            FetchBody::Json(value) => Ok(value),
            FetchBody::Text(text) => {
                serde_json::from_str(&text).map_err(|e| FetchError::decode(url, e))
            }
        }
    }

    /// Fetches a page as text.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_text(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String, FetchError> {
        match self.fetch(url, params, ResponseFormat::Html).await? {
            FetchBody::Text(text) => Ok(text),
            FetchBody::Json(value) => Ok(value.to_string()),
        }
    }

    /// Streams `url` to `path` with a single attempt, returning bytes written.
    ///
    /// The parent directory must already exist. A partially written file is
    /// removed on failure.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Fetch`] for request failures and non-2xx
    /// statuses, [`DownloadError::Io`] for file system failures.
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        debug!(method = "GET", url = %parsed, "sending download request");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| map_send_error(url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::http_status(url, response.status().as_u16()).into());
        }

        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let result = stream_to_file(&mut file, response, url, path).await;
        if result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        result
    }

    async fn attempt(
        &self,
        request_url: &Url,
        display_url: &str,
        format: ResponseFormat,
    ) -> Result<FetchBody, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(format.accept_header()));
        debug!(
            method = "GET",
            url = %display_url,
            params = %redacted_params(request_url),
            headers = ?headers,
            "sending request"
        );

        let response = self
            .client
            .get(request_url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| map_send_error(display_url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_send_error(display_url, e))?;

        if !status.is_success() {
            return Err(FetchError::http_status_with_body(
                display_url,
                status.as_u16(),
                truncate_body(&body),
            ));
        }

        match format {
            ResponseFormat::Json => serde_json::from_str(&body)
                .map(FetchBody::Json)
                .map_err(|e| FetchError::decode(display_url, e)),
            ResponseFormat::Html => Ok(FetchBody::Text(body)),
        }
    }
}

fn log_retry(failure: FailureType, error: &FetchError, attempt: u32, delay: Duration) {
    match failure {
        FailureType::RateLimited => warn!(
            attempt,
            delay_secs = delay.as_secs_f64(),
            %error,
            "rate limited; backing off"
        ),
        _ => {
            let body = match error {
                FetchError::HttpStatus { body, .. } => body.as_str(),
                _ => "",
            };
            error!(
                attempt,
                delay_secs = delay.as_secs_f64(),
                %error,
                body,
                "request failed; retrying"
            );
        }
    }
}

fn base_client_builder(connect_timeout_secs: u64, read_timeout_secs: u64) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}

fn build_url(url: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
    let pairs = params.iter().map(|(key, value)| (*key, value.as_str()));
    Url::parse_with_params(url, pairs).map_err(|_| FetchError::invalid_url(url))
}

fn map_send_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::timeout(url)
    } else {
        FetchError::network(url, error.without_url())
    }
}

/// Returns the URL as a string with the API key value masked.
fn redact_url(url: &Url) -> String {
    if !url.query_pairs().any(|(key, _)| key == SECRET_PARAM) {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == SECRET_PARAM {
                "REDACTED".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

fn redacted_params(url: &Url) -> String {
    url.query_pairs()
        .map(|(key, value)| {
            if key == SECRET_PARAM {
                format!("{key}=REDACTED")
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_LOGGED_BODY_BYTES {
        return body.to_string();
    }
    let mut end = MAX_LOGGED_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| map_send_error(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
