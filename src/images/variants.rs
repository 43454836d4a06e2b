//! Image variant descriptors.
//!
//! The API returns every image as a set of scaled URLs that differ only in
//! one path segment under the upload prefix. A URL scraped from a page only
//! carries one of them; [`ImageReference::from_raw`] rebuilds the full set.

use serde::{Deserialize, Serialize};

use super::rewrite::CANONICAL_UPLOAD_PREFIX;

/// Scale path segment of the full-resolution variant.
pub const ORIGINAL_SCALE: &str = "original";

/// Tag attached to synthesized references.
const DEFAULT_IMAGE_TAGS: &str = "All Images";

/// Scale segments of the reduced variants, in [`ImageReference`] field order.
pub const REDUCED_SCALES: [&str; 8] = [
    "square_avatar",
    "scale_medium",
    "screen_medium",
    "screen_kubrick",
    "scale_small",
    "scale_large",
    "scale_avatar",
    "square_mini",
];

/// A canonical image descriptor with one URL per scale variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_large_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiny_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_tags: Option<String>,
}

impl ImageReference {
    /// Builds a reference from a single raw URL.
    ///
    /// A URL of the form `{upload prefix}{scale}/{rest}` is expanded into every
    /// variant. Anything else is kept verbatim as `original_url`.
    #[must_use]
    pub fn from_raw(url: &str) -> Self {
        let Some(rest) = url
            .strip_prefix(CANONICAL_UPLOAD_PREFIX)
            .and_then(|tail| tail.split_once('/'))
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
        else {
            return Self {
                original_url: Some(url.to_string()),
                ..Self::default()
            };
        };

        let variant = |scale: &str| Some(format!("{CANONICAL_UPLOAD_PREFIX}{scale}/{rest}"));
        let [icon, medium, screen, screen_large, small, large, thumb, tiny] = REDUCED_SCALES;
        Self {
            icon_url: variant(icon),
            medium_url: variant(medium),
            screen_url: variant(screen),
            screen_large_url: variant(screen_large),
            small_url: variant(small),
            super_url: variant(large),
            thumb_url: variant(thumb),
            tiny_url: variant(tiny),
            original_url: variant(ORIGINAL_SCALE),
            image_tags: Some(DEFAULT_IMAGE_TAGS.to_string()),
        }
    }
}
