//! Image reference extraction, URL normalization and downloading.
//!
//! # Pipeline
//!
//! 1. Per-kind extractors in [`crate::resource`] call the primitives in
//!    [`extract`] to collect raw URLs from mirrored records, then [`dedup`].
//! 2. [`ImageDownloader`] rewrites each URL through the [`UrlRewriter`],
//!    rejects anything outside the accepted upload prefixes, and streams the
//!    rest to disk.
//!
//! Scraped pages only expose a single scaled URL per image;
//! [`ImageReference::from_raw`] synthesizes the full variant set from it.

mod downloader;
pub mod extract;
mod rewrite;
mod variants;

pub use downloader::{DEFAULT_IMAGE_DELAY, DownloadTally, ImageDownloader};
pub use extract::{
    dedup, extract_from_field, extract_from_html, extract_from_text_field, extract_string_field,
    linked_entities,
};
pub use rewrite::{
    ACCEPTED_PREFIXES, CANONICAL_UPLOAD_PREFIX, ORIGINAL_UPLOAD_PREFIX, RewriteRule, UrlRewriter,
};
pub use variants::{ImageReference, ORIGINAL_SCALE, REDUCED_SCALES};
