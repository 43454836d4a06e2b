//! Acquisition strategies: turning fetches into complete item collections.
//!
//! # Strategies
//!
//! - [`fetch_all_pages`] - `limit`/`offset` pages until an empty page
//! - [`fetch_single`] - one page, for small fixed vocabularies
//! - [`walk_identifiers`] - one request per identifier up to a caller bound
//! - [`fetch_gallery`] - image-data gallery pages for one owner
//! - [`crawl`] - site listing pages plus per-item detail pages
//!
//! Every strategy is strictly sequential: each request is awaited before the
//! next is issued, and the context's request delay is slept between them.

mod crawl;
mod gallery;
mod paged;
mod walker;

use std::time::Duration;

use serde_json::Value;
use url::Url;

pub use crawl::{CrawledItem, ItemDetail, RelatedLink, crawl, parse_detail, parse_listing};
pub use gallery::{GALLERY_PAGE_SIZE, fetch_gallery};
pub use paged::{PAGE_SIZE, fetch_all_pages, fetch_page, fetch_single};
pub use walker::{IdentifierSource, WalkTally, fetch_identifier, walk_identifiers};

use crate::fetch::{ApiClient, FetchError};
use crate::resource::Acquisition;

/// Default API root.
pub const DEFAULT_API_BASE_URL: &str = "https://www.giantbomb.com/api";

/// Default site root, used for crawling.
pub const DEFAULT_SITE_BASE_URL: &str = "https://www.giantbomb.com";

/// Default host of the image-data service.
pub const DEFAULT_IMAGE_DATA_BASE_URL: &str = "https://www.giantbomb.com";

/// Default politeness delay between API requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

const IMAGE_DATA_PATH: &str = "/js/image-data.json";

/// Base URLs of the three remote surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// API root, e.g. `https://www.giantbomb.com/api`.
    pub api_base_url: String,
    /// Site root for listing and detail pages.
    pub site_base_url: String,
    /// Host serving `js/image-data.json`.
    pub image_data_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            site_base_url: DEFAULT_SITE_BASE_URL.to_string(),
            image_data_base_url: DEFAULT_IMAGE_DATA_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every surface at one host. Used against local mock servers.
    #[must_use]
    pub fn single_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base_url: format!("{base}/api"),
            site_base_url: base.to_string(),
            image_data_base_url: base.to_string(),
        }
    }

    /// `{api}/{endpoint}/`
    #[must_use]
    pub fn resource_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}/", self.api_base_url.trim_end_matches('/'))
    }

    /// `{api}/{endpoint}/{id}/`
    #[must_use]
    pub fn identifier_url(&self, endpoint: &str, id: u64) -> String {
        format!("{}/{endpoint}/{id}/", self.api_base_url.trim_end_matches('/'))
    }

    /// `{image-data}/js/image-data.json`
    #[must_use]
    pub fn image_data_url(&self) -> String {
        format!(
            "{}{IMAGE_DATA_PATH}",
            self.image_data_base_url.trim_end_matches('/')
        )
    }

    /// Resolves a site path such as `/news/` against the site root.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the site root or the path is malformed.
    pub fn site_url(&self, path: &str) -> Result<Url, FetchError> {
        let root = format!("{}/", self.site_base_url.trim_end_matches('/'));
        Url::parse(&root)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(|_| FetchError::invalid_url(format!("{root}{path}")))
    }
}

/// Everything a strategy needs to issue requests.
#[derive(Debug, Clone, Copy)]
pub struct AcquireContext<'a> {
    /// Shared retrying client.
    pub client: &'a ApiClient,
    /// API credential sent with every API request.
    pub api_key: &'a str,
    /// Remote base URLs.
    pub endpoints: &'a Endpoints,
    /// Pause between consecutive requests of one strategy.
    pub request_delay: Duration,
}

impl AcquireContext<'_> {
    /// Query parameters common to every API request.
    #[must_use]
    pub fn api_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.to_string()),
            ("format", "json".to_string()),
        ]
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }
}

/// Runs `acquisition` to completion and returns every record in server order.
///
/// Bucketed strategies are collected into one list (gallery pages are
/// flattened). The orchestrator walks those itself so it can persist and skip
/// per identifier.
///
/// # Errors
///
/// Returns the first [`FetchError`] that exhausted its retries.
pub async fn collect(
    ctx: &AcquireContext<'_>,
    acquisition: &Acquisition,
) -> Result<Vec<Value>, FetchError> {
    match acquisition {
        Acquisition::Paged { endpoint } => fetch_all_pages(ctx, endpoint).await,
        Acquisition::Single { endpoint } => fetch_single(ctx, endpoint).await,
        Acquisition::Crawl {
            listing_path,
            listing_type,
        } => {
            let items = crawl(ctx, listing_path, listing_type).await?;
            Ok(items.iter().map(CrawledItem::to_value).collect())
        }
        Acquisition::PerIdentifier { .. } | Acquisition::Gallery { .. } => {
            let Some((source, max_id)) = IdentifierSource::for_acquisition(acquisition) else {
                return Ok(Vec::new());
            };
            let mut items = Vec::new();
            walk_identifiers::<FetchError, _, _>(ctx, &source, max_id, |_| false, |_, value| {
                match value {
                    Value::Array(records) => items.extend(records),
                    record => items.push(record),
                }
                Ok(())
            })
            .await?;
            Ok(items)
        }
    }
}
