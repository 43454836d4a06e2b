//! Per-kind image extraction rules.
//!
//! Each function has the `fn(&[Value]) -> Vec<String>` shape stored in a
//! [`ResourceSpec`](super::ResourceSpec). Results are raw and may contain
//! duplicates; the registry dedups.

use serde_json::Value;

use crate::images::{
    extract_from_field, extract_from_text_field, extract_string_field, linked_entities,
};

/// Catalog entries with a main image and a rich description.
pub fn image_and_description(items: &[Value]) -> Vec<String> {
    let mut urls = extract_from_field(items, "image");
    urls.extend(extract_from_text_field(items, "description"));
    urls
}

/// Entries with a main image only.
pub fn image_only(items: &[Value]) -> Vec<String> {
    extract_from_field(items, "image")
}

/// Reviews: images live in the body text only.
pub fn description_only(items: &[Value]) -> Vec<String> {
    extract_from_text_field(items, "description")
}

pub fn video_show_images(items: &[Value]) -> Vec<String> {
    let mut urls = extract_from_field(items, "image");
    urls.extend(extract_from_field(items, "logo"));
    urls
}

/// Videos plus the artwork of the show each video links to.
pub fn video_images(items: &[Value]) -> Vec<String> {
    let mut urls = extract_from_field(items, "image");
    let shows = linked_entities(items, "video_show");
    urls.extend(extract_from_field(&shows, "logo"));
    urls.extend(extract_from_field(&shows, "image"));
    urls
}

/// Gallery entries hold the full-size URL as a plain string.
pub fn gallery_images(items: &[Value]) -> Vec<String> {
    extract_string_field(items, "original")
}

/// Crawled articles: synthesized cover image plus images in the body.
pub fn article_images(items: &[Value]) -> Vec<String> {
    let mut urls = extract_from_field(items, "image");
    urls.extend(extract_from_text_field(items, "content"));
    urls
}

pub fn no_images(_items: &[Value]) -> Vec<String> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_video_images_include_linked_show_artwork() {
        let items = vec![json!({
            "image": {"original_url": "https://a/video.jpg"},
            "video_show": {
                "logo": {"original_url": "https://a/logo.png"},
                "image": {"original_url": "https://a/show.jpg"}
            }
        })];
        assert_eq!(
            video_images(&items),
            vec![
                "https://a/video.jpg".to_string(),
                "https://a/logo.png".to_string(),
                "https://a/show.jpg".to_string()
            ]
        );
    }

    #[test]
    fn test_video_show_images_include_logo() {
        let items = vec![json!({
            "image": {"original_url": "https://a/show.jpg"},
            "logo": {"original_url": "https://a/logo.png"}
        })];
        assert_eq!(video_show_images(&items).len(), 2);
    }

    #[test]
    fn test_description_only_ignores_image_field() {
        let items = vec![json!({
            "image": {"original_url": "https://a/cover.jpg"},
            "description": "<img src=\"https://a/body.jpg\">"
        })];
        assert_eq!(description_only(&items), vec!["https://a/body.jpg".to_string()]);
    }

    #[test]
    fn test_article_images_read_cover_and_content() {
        let items = vec![json!({
            "image": {"original_url": "https://a/cover.jpg"},
            "content": "<figure data-img-src=\"https://a/inline.jpg\"></figure>"
        })];
        assert_eq!(article_images(&items).len(), 2);
    }

    #[test]
    fn test_no_images() {
        assert!(no_images(&[json!({"image": {"original_url": "x"}})]).is_empty());
    }
}
