//! HTML crawl of site listing pages with per-item detail enrichment.
//!
//! Listing pages are requested as `{listing}?type=..&page=1,2,..` until a page
//! yields no items. Each item's detail page is then fetched for its body,
//! related links and attribution; when that fetch fails the item is kept with
//! its summary fields alone.
//!
//! Parsing is structural and every element except the item link is optional.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::AcquireContext;
use crate::fetch::FetchError;
use crate::images::ImageReference;

#[allow(clippy::expect_used)]
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid") // Static selector, safe to panic
}

static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("article.listing-item, li.listing-item"));
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("h3, .title"));
static DECK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(".deck"));
static IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static CONTENT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector(".article-body, .content-body"));
static RELATED_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(".related a[href]"));
static DATE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("time"));
static AUTHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector(".author a, a[rel=author], .author"));

/// Image source attributes, lazy-loading first.
const IMAGE_SOURCE_ATTRIBUTES: [&str; 2] = ["data-src", "src"];

/// A link from a detail page to related content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
}

/// Fields only available from an item's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemDetail {
    /// Inner HTML of the body.
    pub content: Option<String>,
    pub related: Vec<RelatedLink>,
    /// Publication date as given by the page.
    pub date: Option<String>,
    /// Author name.
    pub user: Option<String>,
}

/// One crawled item: listing summary plus detail fields when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawledItem {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub deck: Option<String>,
    pub image: Option<ImageReference>,
    #[serde(flatten)]
    pub detail: Option<ItemDetail>,
}

impl CrawledItem {
    /// Converts the item into the JSON record persisted for it.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Crawls `listing_path` until a listing page yields no new items.
///
/// # Errors
///
/// Returns [`FetchError`] if a listing page exhausted its retries. Detail
/// page failures are logged and never returned.
#[instrument(skip(ctx))]
pub async fn crawl(
    ctx: &AcquireContext<'_>,
    listing_path: &str,
    listing_type: &str,
) -> Result<Vec<CrawledItem>, FetchError> {
    let listing_url = ctx.endpoints.site_url(listing_path)?;
    let mut items = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page: u32 = 1;

    loop {
        let params = [
            ("type", listing_type.to_string()),
            ("page", page.to_string()),
        ];
        let html = ctx.client.fetch_text(listing_url.as_str(), &params).await?;
        let summaries = parse_listing(&html, &listing_url);
        if summaries.is_empty() {
            debug!(page, "listing page is empty; crawl complete");
            break;
        }

        let fresh: Vec<CrawledItem> = summaries
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        if fresh.is_empty() {
            warn!(page, "listing page repeats earlier items; stopping crawl");
            break;
        }

        for mut item in fresh {
            ctx.pause().await;
            match fetch_detail(ctx, &item.url).await {
                Ok(detail) => item.detail = Some(detail),
                Err(e) => warn!(url = %item.url, error = %e, "detail fetch failed; keeping summary"),
            }
            items.push(item);
        }

        info!(page, total = items.len(), "crawled listing page");
        page += 1;
        ctx.pause().await;
    }

    Ok(items)
}

async fn fetch_detail(ctx: &AcquireContext<'_>, url: &str) -> Result<ItemDetail, FetchError> {
    let page_url = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
    let html = ctx.client.fetch_text(url, &[]).await?;
    Ok(parse_detail(&html, &page_url))
}

/// Parses the item summaries of one listing page.
///
/// Items without a link are dropped; the id comes from `data-id` or, failing
/// that, the last segment of the item URL.
#[must_use]
pub fn parse_listing(html: &str, base: &Url) -> Vec<CrawledItem> {
    let document = Html::parse_document(html);
    document
        .select(&ITEM_SELECTOR)
        .filter_map(|element| parse_summary(element, base))
        .collect()
}

fn parse_summary(element: ElementRef<'_>, base: &Url) -> Option<CrawledItem> {
    let href = element
        .select(&LINK_SELECTOR)
        .find_map(|link| link.value().attr("href"))?;
    let url = base.join(href).ok()?;

    let id = element
        .value()
        .attr("data-id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .or_else(|| last_path_segment(&url))?;

    let image = element.select(&IMAGE_SELECTOR).find_map(|img| {
        IMAGE_SOURCE_ATTRIBUTES
            .iter()
            .filter_map(|name| img.value().attr(name))
            .map(str::trim)
            .find(|src| !src.is_empty())
            .and_then(|src| base.join(src).ok())
            .map(|src| ImageReference::from_raw(src.as_str()))
    });

    Some(CrawledItem {
        id,
        url: url.to_string(),
        title: first_text(element, &TITLE_SELECTOR),
        deck: first_text(element, &DECK_SELECTOR),
        image,
        detail: None,
    })
}

/// Parses the detail fields of one item page.
#[must_use]
pub fn parse_detail(html: &str, page_url: &Url) -> ItemDetail {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let content = root
        .select(&CONTENT_SELECTOR)
        .next()
        .map(|body| body.inner_html().trim().to_string())
        .filter(|body| !body.is_empty());

    let related = root
        .select(&RELATED_SELECTOR)
        .filter_map(|link| {
            let url = page_url.join(link.value().attr("href")?).ok()?;
            Some(RelatedLink {
                title: collapse_text(link),
                url: url.to_string(),
            })
        })
        .collect();

    let date = root.select(&DATE_SELECTOR).next().and_then(|time| {
        time.value()
            .attr("datetime")
            .map(ToString::to_string)
            .or_else(|| Some(collapse_text(time)))
            .filter(|date| !date.is_empty())
    });

    ItemDetail {
        content,
        related,
        date,
        user: first_text(root, &AUTHOR_SELECTOR),
    }
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(collapse_text)
        .find(|text| !text.is_empty())
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(ToString::to_string)
}
