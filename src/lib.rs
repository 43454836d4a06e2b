//! Giant Bomb API mirror core library
//!
//! This library mirrors the Giant Bomb catalog API (and, for articles, the
//! public website) onto local disk as JSON snapshots plus downloaded images.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Retrying HTTP fetch with rate-limit aware backoff
//! - [`acquire`] - Per-resource acquisition strategies (paging, walking, crawling)
//! - [`images`] - Image reference extraction, URL normalization and downloading
//! - [`resource`] - Resource kinds and the kind → strategy registry
//! - [`mirror`] - The orchestrator tying acquisition, persistence and images together
//! - [`layout`] - On-disk path layout for mirrored resources
//! - [`json_file`] - JSON snapshot read/write helpers
//! - [`logging`] - Verbosity configuration and tracing subscriber setup

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod acquire;
pub mod fetch;
pub mod images;
pub mod json_file;
pub mod layout;
pub mod logging;
pub mod mirror;
pub mod resource;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use acquire::{AcquireContext, Endpoints, PAGE_SIZE};
pub use fetch::{
    ApiClient, ApiEnvelope, BackoffPolicy, DownloadError, FailureType, FetchError,
    ResponseFormat, RetryDecision, classify_error,
};
pub use images::{DownloadTally, ImageDownloader, ImageReference, UrlRewriter};
pub use json_file::{JsonFileError, load_json_file, save_json_file};
pub use logging::{Verbosity, VerbosityConflict, init_tracing};
pub use mirror::{KindReport, KindStatus, Mirror, MirrorError, MirrorOptions, MirrorReport};
pub use resource::{
    Acquisition, ResourceKind, ResourceParseError, ResourceRegistry, ResourceSpec,
    parse_include_list,
};
