//! Sequential image downloader with skip/overwrite policy.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, error, info, instrument, warn};

use super::rewrite::UrlRewriter;
use crate::fetch::{ApiClient, DownloadError};

/// Default pause after each successful image download.
pub const DEFAULT_IMAGE_DELAY: Duration = Duration::from_millis(500);

/// Leading `.ext` of an extension that may carry trailing junk.
#[allow(clippy::expect_used)]
static EXTENSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\.\w+)(.*?)$").expect("extension regex is valid") // Static pattern, safe to panic
});

/// Outcome counts for one batch of image downloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadTally {
    /// Files fetched and written.
    pub downloaded: usize,
    /// Files already present and left alone.
    pub skipped: usize,
    /// Files that failed to download.
    pub errored: usize,
    /// URLs outside the accepted prefixes (not counted as errors).
    pub unsupported: usize,
}

/// Downloads image URLs into a directory tree mirroring their upload paths.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: ApiClient,
    rewriter: UrlRewriter,
    delay: Duration,
}

impl ImageDownloader {
    /// Creates a downloader sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: ApiClient, rewriter: UrlRewriter, delay: Duration) -> Self {
        Self {
            client,
            rewriter,
            delay,
        }
    }

    /// Returns the URL rewriter in use.
    #[must_use]
    pub fn rewriter(&self) -> &UrlRewriter {
        &self.rewriter
    }

    /// Normalizes `url` and maps it to a path under `target_dir`.
    ///
    /// Returns the rewritten URL and its target path, or `None` when the URL is
    /// outside every accepted prefix or would escape `target_dir`.
    #[must_use]
    pub fn target_path(&self, url: &str, target_dir: &Path) -> Option<(String, PathBuf)> {
        let rewritten = self.rewriter.rewrite(url);
        let prefix = self.rewriter.accepted_prefix(&rewritten)?;
        let remainder = rewritten[prefix.len()..].to_string();
        let relative = safe_relative_path(&clean_extension(&remainder))?;
        Some((rewritten, target_dir.join(relative)))
    }

    /// Downloads every URL in order, isolating per-URL failures.
    ///
    /// Existing files are skipped unless `overwrite_existing` is set.
    #[instrument(skip(self, urls), fields(count = urls.len(), target = %target_dir.display()))]
    pub async fn download_all(
        &self,
        urls: &[String],
        target_dir: &Path,
        overwrite_existing: bool,
    ) -> DownloadTally {
        let mut tally = DownloadTally::default();

        for url in urls {
            let Some((rewritten, target)) = self.target_path(url, target_dir) else {
                warn!(url = %url, "unhandled image URL; skipping");
                tally.unsupported += 1;
                continue;
            };

            if !overwrite_existing && target.is_file() {
                debug!(path = %target.display(), "skipping existing image");
                tally.skipped += 1;
                continue;
            }

            debug!(url = %rewritten, "downloading image");
            match self.download_one(&rewritten, &target).await {
                Ok(bytes) => {
                    debug!(path = %target.display(), bytes, "image saved");
                    tally.downloaded += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    error!(url = %rewritten, error = %e, "error downloading image");
                    tally.errored += 1;
                }
            }
        }

        info!(
            downloaded = tally.downloaded,
            skipped = tally.skipped,
            errored = tally.errored,
            unsupported = tally.unsupported,
            "image batch complete"
        );
        tally
    }

    async fn download_one(&self, url: &str, target: &Path) -> Result<u64, DownloadError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }
        self.client.download_to_file(url, target).await
    }
}

/// Drops any query or fragment and trailing junk after the file extension.
fn clean_extension(remainder: &str) -> String {
    let without_query = remainder
        .split(['?', '#'])
        .next()
        .unwrap_or(remainder);

    let file_start = without_query.rfind('/').map_or(0, |i| i + 1);
    let Some(dot) = without_query[file_start..].rfind('.') else {
        return without_query.to_string();
    };
    let split = file_start + dot;
    let (stem, ext) = without_query.split_at(split);
    let clean = EXTENSION_PATTERN.replace(ext, "$1");
    format!("{stem}{clean}")
}

/// Converts an upload remainder into a relative path, rejecting traversal.
fn safe_relative_path(remainder: &str) -> Option<PathBuf> {
    let relative = PathBuf::from(remainder.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        .then_some(relative)
}
