//! Image-data gallery pager.

use serde_json::Value;
use tracing::{debug, instrument};

use super::AcquireContext;
use crate::fetch::{FetchError, items_at};

/// Images requested per gallery page.
pub const GALLERY_PAGE_SIZE: usize = 100;

/// Fetches every image of the gallery `{owner_tag}-{id}`.
///
/// Pages are requested with `count`/`start` until one returns fewer than
/// `count` images.
///
/// # Errors
///
/// Returns [`FetchError`] if any page exhausted its retries.
#[instrument(skip(ctx))]
pub async fn fetch_gallery(
    ctx: &AcquireContext<'_>,
    owner_tag: &str,
    id: u64,
) -> Result<Vec<Value>, FetchError> {
    let url = ctx.endpoints.image_data_url();
    let gallery = format!("{owner_tag}-{id}");
    let mut images = Vec::new();
    let mut start = 0;

    loop {
        let params = [
            ("images", gallery.clone()),
            ("count", GALLERY_PAGE_SIZE.to_string()),
            ("start", start.to_string()),
        ];
        let body = ctx.client.fetch_json(&url, &params).await?;
        let page = items_at(&body, "images", &gallery);
        let count = page.len();
        debug!(start, count, "fetched gallery page");
        images.extend(page);

        if count < GALLERY_PAGE_SIZE {
            break;
        }
        start += count;
        ctx.pause().await;
    }

    Ok(images)
}
