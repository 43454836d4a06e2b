//! Error types for the fetch module.
//!
//! [`FetchError`] covers a single API/site request including its retry loop;
//! [`DownloadError`] covers streaming an image to disk.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-2xx HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Leading part of the response body, for diagnostics.
        body: String,
    },

    /// A 2xx response whose body was not valid JSON.
    #[error("malformed JSON from {url}: {source}")]
    Decode {
        /// The URL that returned the malformed body.
        url: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The provided URL (or URL plus parameters) is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Every attempt allowed by the backoff policy failed.
    #[error("unable to fetch {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        /// The URL that could not be fetched.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Display form of the last failure.
        last_error: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error without a body excerpt.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: String::new(),
        }
    }

    /// Creates an HTTP status error carrying an excerpt of the response body.
    pub fn http_status_with_body(url: impl Into<String>, status: u16, body: String) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates the terminal error raised once the retry budget is spent.
    pub fn exhausted(url: impl Into<String>, attempts: u32, last_error: &FetchError) -> Self {
        Self::Exhausted {
            url: url.into(),
            attempts,
            last_error: last_error.to_string(),
        }
    }

    /// Returns the HTTP status for status errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that can occur while streaming an image to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request itself failed (network, status, bad URL).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// File system error while creating or writing the target file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// Neither `From<reqwest::Error>` nor `From<std::io::Error>` is implemented:
// every variant needs the url or path the source error does not carry.
