//! Retrying HTTP fetch primitive for the catalog API and website.
//!
//! This module provides the [`ApiClient`] which issues one GET at a time,
//! retrying transient failures with a short delay and explicit rate-limit
//! responses with a much longer one, as decided by a [`BackoffPolicy`].
//!
//! # Features
//!
//! - JSON mode for API calls, text mode for scraping site pages
//! - Distinct backoff for rate limiting (HTTP 420/429) vs other failures
//! - Debug trace of every attempted request (api key redacted)
//! - Validating accessor over the `{ error, results }` response envelope
//! - Streaming single-shot file downloads for images
//!
//! # Example
//!
//! ```no_run
//! use gb_mirror_core::fetch::{ApiClient, BackoffPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(BackoffPolicy::default());
//! let params = [("api_key", "secret".to_string()), ("format", "json".to_string())];
//! let body = client.fetch_json("https://www.giantbomb.com/api/types/", &params).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod client;
pub(crate) mod constants;
mod error;
mod response;
mod retry;

pub use client::{ApiClient, FetchBody, ResponseFormat};
pub use error::{DownloadError, FetchError};
pub use response::{ApiEnvelope, items_at, is_truthy};
pub use retry::{BackoffPolicy, FailureType, RetryDecision, classify_error};

// Note: module-local Result aliases are not defined here.
// Use `Result<T, FetchError>` explicitly in function signatures.
