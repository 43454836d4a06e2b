//! Image reference extraction from mirrored records.
//!
//! Records carry images in two ways: structured image objects
//! (`{"original_url": ..., ...}`) and rich HTML text fields with embedded
//! figures and `<img>` tags. Both primitives skip records missing the field.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::trace;

use super::rewrite::ORIGINAL_UPLOAD_PREFIX;
use crate::fetch::is_truthy;

/// Variant pulled out of structured image objects.
const IMAGE_SIZE_FIELD: &str = "original_url";

/// Source-set attributes checked on `<img>` tags, in priority order.
const SRCSET_ATTRIBUTES: [&str; 3] = ["srcset", "data-srcset", "data-lazy-srcset"];

/// Plain source attributes checked when no source-set entry qualifies.
const SRC_ATTRIBUTES: [&str; 2] = ["src", "data-src"];

#[allow(clippy::expect_used)]
static FIGURE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("figure[data-img-src]").expect("figure selector is valid") // Static selector, safe to panic
});

#[allow(clippy::expect_used)]
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("img selector is valid")); // Static selector, safe to panic

/// Returns the original-size URL of the image object stored under `field`.
#[must_use]
pub fn extract_from_field(items: &[Value], field: &str) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.get(field))
        .filter(|image| is_truthy(image))
        .filter_map(|image| image.get(IMAGE_SIZE_FIELD))
        .filter_map(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Returns `field` itself when it holds a non-empty URL string.
#[must_use]
pub fn extract_string_field(items: &[Value], field: &str) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.get(field))
        .filter_map(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Returns every image URL embedded in the HTML held by `field`.
#[must_use]
pub fn extract_from_text_field(items: &[Value], field: &str) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.get(field))
        .filter_map(Value::as_str)
        .filter(|html| !html.is_empty())
        .flat_map(extract_from_html)
        .collect()
}

/// Collects the non-empty linked sub-records stored under `field`.
///
/// A video carries its show as a nested record; extracting from the nested
/// records picks up the show's artwork as well.
#[must_use]
pub fn linked_entities(items: &[Value], field: &str) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| item.get(field))
        .filter(|linked| is_truthy(linked))
        .cloned()
        .collect()
}

/// Extracts image URLs from an HTML fragment.
///
/// Figures contribute every entry of their `data-img-src` list. Each `<img>`
/// contributes the full-resolution entries of its first source-set attribute,
/// or its plain source when none qualify.
#[must_use]
pub fn extract_from_html(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let mut urls = Vec::new();

    for figure in fragment.select(&FIGURE_SELECTOR) {
        if let Some(sources) = figure.value().attr("data-img-src") {
            urls.extend(
                sources
                    .split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(ToString::to_string),
            );
        }
    }

    for img in fragment.select(&IMG_SELECTOR) {
        let from_srcset = original_srcset_entries(img);
        if from_srcset.is_empty() {
            if let Some(src) = plain_source(img) {
                urls.push(src);
            }
        } else {
            urls.extend(from_srcset);
        }
    }

    trace!(count = urls.len(), "extracted image urls from html");
    urls
}

fn original_srcset_entries(img: ElementRef<'_>) -> Vec<String> {
    let Some(srcset) = SRCSET_ATTRIBUTES
        .iter()
        .find_map(|name| img.value().attr(name))
    else {
        return Vec::new();
    };

    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
        .filter(|url| url.starts_with(ORIGINAL_UPLOAD_PREFIX))
        .map(ToString::to_string)
        .collect()
}

fn plain_source(img: ElementRef<'_>) -> Option<String> {
    SRC_ATTRIBUTES
        .iter()
        .find_map(|name| img.value().attr(name))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(ToString::to_string)
}

/// Removes duplicate URLs. The result is sorted, not in extraction order.
#[must_use]
pub fn dedup(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
