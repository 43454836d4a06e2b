//! Run configuration for the orchestrator.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::acquire::{DEFAULT_REQUEST_DELAY, Endpoints};
use crate::fetch::BackoffPolicy;
use crate::images::{DEFAULT_IMAGE_DELAY, UrlRewriter};
use crate::resource::ResourceKind;

/// Everything one mirror run needs.
///
/// Built with [`MirrorOptions::new`] and adjusted through the public fields.
#[derive(Clone)]
pub struct MirrorOptions {
    /// Directory the mirror is written into.
    pub target_dir: PathBuf,
    /// Kinds to mirror, in order. Empty means every registered kind.
    pub kinds: Vec<ResourceKind>,
    /// Download images referenced by mirrored records.
    pub download_images: bool,
    /// Leave existing resource files alone instead of refetching them.
    pub skip_existing: bool,
    /// Re-download images that already exist on disk.
    pub overwrite_images: bool,
    /// API credential.
    pub api_key: String,
    /// Remote base URLs.
    pub endpoints: Endpoints,
    /// Retry budget and backoff delays.
    pub backoff: BackoffPolicy,
    /// Pause between consecutive API or site requests.
    pub request_delay: Duration,
    /// Pause after each downloaded image.
    pub image_delay: Duration,
    /// Overrides the registry's walk bound for per-identifier kinds.
    pub max_identifier: Option<u64>,
    /// URL normalization applied before image download.
    pub image_rewriter: UrlRewriter,
}

impl MirrorOptions {
    /// Creates options with every default for `target_dir`.
    #[must_use]
    pub fn new(target_dir: impl Into<PathBuf>, api_key: impl Into<String>) -> Self {
        Self {
            target_dir: target_dir.into(),
            kinds: Vec::new(),
            download_images: false,
            skip_existing: false,
            overwrite_images: false,
            api_key: api_key.into(),
            endpoints: Endpoints::default(),
            backoff: BackoffPolicy::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
            image_delay: DEFAULT_IMAGE_DELAY,
            max_identifier: None,
            image_rewriter: UrlRewriter::default(),
        }
    }
}

impl fmt::Debug for MirrorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorOptions")
            .field("target_dir", &self.target_dir)
            .field("kinds", &self.kinds)
            .field("download_images", &self.download_images)
            .field("skip_existing", &self.skip_existing)
            .field("overwrite_images", &self.overwrite_images)
            .field("api_key", &"[redacted]")
            .field("endpoints", &self.endpoints)
            .field("backoff", &self.backoff)
            .field("request_delay", &self.request_delay)
            .field("image_delay", &self.image_delay)
            .field("max_identifier", &self.max_identifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MirrorOptions::new("/mirror", "secret");
        assert!(options.kinds.is_empty());
        assert!(!options.download_images);
        assert_eq!(options.request_delay, Duration::from_secs(1));
        assert_eq!(options.image_delay, Duration::from_millis(500));
        assert_eq!(options.backoff, BackoffPolicy::default());
        assert_eq!(options.endpoints, Endpoints::default());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let options = MirrorOptions::new("/mirror", "secret");
        let debug = format!("{options:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[redacted]"));
    }
}
