//! Resource kind → strategy registry.
//!
//! Adding a resource kind means adding one [`ResourceSpec`] to
//! [`ResourceRegistry::default`]; acquisition and extraction dispatch read
//! the registry and never match on kinds themselves.

use serde_json::Value;
use tracing::error;

use super::extractors;
use super::kind::ResourceKind;
use crate::images::dedup;

/// Default upper bound for per-identifier walks.
pub const DEFAULT_MAX_IDENTIFIER: u64 = 1000;

/// Owner tag of user profile images in the image-data service.
const PROFILE_IMAGE_OWNER_TAG: &str = "1310";

/// How a resource kind's records are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// `limit`/`offset` pages until an empty page.
    Paged {
        /// API endpoint name.
        endpoint: &'static str,
    },
    /// One `offset=0` page.
    Single {
        /// API endpoint name.
        endpoint: &'static str,
    },
    /// `{endpoint}/{id}/` for every id in `1..=max_id`, one file per id.
    PerIdentifier {
        /// API endpoint name (singular for the review kind).
        endpoint: &'static str,
        /// Walk bound. Not discovered from the server.
        max_id: u64,
    },
    /// Image-data gallery of `{owner_tag}-{id}` for every id in `1..=max_id`.
    Gallery {
        /// Image-data owner tag.
        owner_tag: &'static str,
        /// Walk bound.
        max_id: u64,
    },
    /// Site listing pages plus one detail page per item.
    Crawl {
        /// Path of the listing page on the site.
        listing_path: &'static str,
        /// Value of the listing's `type` query parameter.
        listing_type: &'static str,
    },
}

impl Acquisition {
    /// Returns true for strategies that store one file per identifier.
    #[must_use]
    pub fn is_bucketed(&self) -> bool {
        matches!(self, Self::PerIdentifier { .. } | Self::Gallery { .. })
    }

    /// Returns the walk bound of bucketed strategies.
    #[must_use]
    pub fn max_identifier(&self) -> Option<u64> {
        match self {
            Self::PerIdentifier { max_id, .. } | Self::Gallery { max_id, .. } => Some(*max_id),
            _ => None,
        }
    }
}

/// Image extraction function for one kind.
pub type ExtractFn = fn(&[Value]) -> Vec<String>;

/// Everything the orchestrator needs to mirror one resource kind.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    /// The kind this entry describes.
    pub kind: ResourceKind,
    /// How to fetch it.
    pub acquisition: Acquisition,
    /// How to pull image URLs out of its records.
    pub extract_images: ExtractFn,
}

impl ResourceSpec {
    fn paged(kind: ResourceKind, extract_images: ExtractFn) -> Self {
        Self {
            kind,
            acquisition: Acquisition::Paged {
                endpoint: kind.as_str(),
            },
            extract_images,
        }
    }
}

/// Ordered table of resource specs.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    specs: Vec<ResourceSpec>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        use ResourceKind as K;
        use extractors::{
            article_images, description_only, gallery_images, image_and_description, image_only,
            no_images, video_images, video_show_images,
        };

        Self::new(vec![
            ResourceSpec::paged(K::Accessories, image_and_description),
            ResourceSpec::paged(K::Characters, image_and_description),
            ResourceSpec::paged(K::Chats, no_images),
            ResourceSpec::paged(K::Companies, image_and_description),
            ResourceSpec::paged(K::Concepts, image_and_description),
            ResourceSpec::paged(K::Dlcs, image_only),
            ResourceSpec::paged(K::Franchises, image_and_description),
            ResourceSpec::paged(K::Games, image_and_description),
            ResourceSpec::paged(K::GameRatings, no_images),
            ResourceSpec::paged(K::Genres, image_only),
            ResourceSpec::paged(K::Locations, image_and_description),
            ResourceSpec::paged(K::Objects, image_and_description),
            ResourceSpec::paged(K::People, image_and_description),
            ResourceSpec::paged(K::Platforms, image_and_description),
            ResourceSpec::paged(K::Promos, no_images),
            ResourceSpec::paged(K::RatingBoards, image_only),
            ResourceSpec::paged(K::Regions, image_only),
            ResourceSpec::paged(K::Releases, image_only),
            ResourceSpec {
                kind: K::Reviews,
                acquisition: Acquisition::PerIdentifier {
                    endpoint: "review",
                    max_id: DEFAULT_MAX_IDENTIFIER,
                },
                extract_images: description_only,
            },
            ResourceSpec {
                kind: K::ProfileImages,
                acquisition: Acquisition::Gallery {
                    owner_tag: PROFILE_IMAGE_OWNER_TAG,
                    max_id: DEFAULT_MAX_IDENTIFIER,
                },
                extract_images: gallery_images,
            },
            ResourceSpec::paged(K::Themes, no_images),
            ResourceSpec {
                kind: K::Types,
                acquisition: Acquisition::Single { endpoint: "types" },
                extract_images: no_images,
            },
            ResourceSpec::paged(K::UserReviews, description_only),
            ResourceSpec::paged(K::VideoCategories, image_only),
            ResourceSpec::paged(K::VideoShows, video_show_images),
            ResourceSpec::paged(K::VideoTypes, no_images),
            ResourceSpec::paged(K::Videos, video_images),
            ResourceSpec {
                kind: K::Articles,
                acquisition: Acquisition::Crawl {
                    listing_path: "/news/",
                    listing_type: "article",
                },
                extract_images: article_images,
            },
        ])
    }
}

impl ResourceRegistry {
    /// Creates a registry from explicit specs. Later duplicates of a kind are ignored.
    #[must_use]
    pub fn new(specs: Vec<ResourceSpec>) -> Self {
        let mut unique: Vec<ResourceSpec> = Vec::with_capacity(specs.len());
        for spec in specs {
            if !unique.iter().any(|existing| existing.kind == spec.kind) {
                unique.push(spec);
            }
        }
        Self { specs: unique }
    }

    /// Looks up the entry for `kind`.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<&ResourceSpec> {
        self.specs.iter().find(|spec| spec.kind == kind)
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.specs.iter().map(|spec| spec.kind)
    }

    /// Extracts and dedups image URLs for `kind`.
    ///
    /// An unregistered kind is logged as an error and yields nothing.
    #[must_use]
    pub fn extract_images(&self, kind: ResourceKind, items: &[Value]) -> Vec<String> {
        let Some(spec) = self.get(kind) else {
            error!(resource = %kind, "unable to extract images for unregistered resource");
            return Vec::new();
        };
        dedup((spec.extract_images)(items))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_registry_covers_every_kind_once() {
        let registry = ResourceRegistry::default();
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(kinds, ResourceKind::ALL.to_vec());
    }

    #[test]
    fn test_default_strategies_for_special_kinds() {
        let registry = ResourceRegistry::default();
        assert_eq!(
            registry.get(ResourceKind::Reviews).map(|s| &s.acquisition),
            Some(&Acquisition::PerIdentifier {
                endpoint: "review",
                max_id: 1000
            })
        );
        assert!(matches!(
            registry.get(ResourceKind::Types).map(|s| &s.acquisition),
            Some(Acquisition::Single { .. })
        ));
        assert!(matches!(
            registry.get(ResourceKind::Games).map(|s| &s.acquisition),
            Some(Acquisition::Paged { endpoint: "games" })
        ));
        assert!(matches!(
            registry.get(ResourceKind::Articles).map(|s| &s.acquisition),
            Some(Acquisition::Crawl { .. })
        ));
        assert!(
            registry
                .get(ResourceKind::ProfileImages)
                .is_some_and(|s| s.acquisition.is_bucketed())
        );
    }

    #[test]
    fn test_unregistered_kind_extracts_nothing() {
        let registry = ResourceRegistry::new(vec![]);
        let items = vec![json!({"image": {"original_url": "https://a/1.jpg"}})];
        assert!(registry.extract_images(ResourceKind::Games, &items).is_empty());
        assert!(registry.get(ResourceKind::Games).is_none());
    }

    #[test]
    fn test_extract_images_dedups() {
        let registry = ResourceRegistry::default();
        let items = vec![
            json!({"image": {"original_url": "https://a/1.jpg"}}),
            json!({"image": {"original_url": "https://a/1.jpg"}}),
        ];
        assert_eq!(
            registry.extract_images(ResourceKind::Games, &items),
            vec!["https://a/1.jpg".to_string()]
        );
    }

    #[test]
    fn test_duplicate_specs_keep_first() {
        let registry = ResourceRegistry::new(vec![
            ResourceSpec::paged(ResourceKind::Games, extractors::no_images),
            ResourceSpec::paged(ResourceKind::Games, extractors::image_only),
        ]);
        let items = vec![json!({"image": {"original_url": "https://a/1.jpg"}})];
        assert_eq!(registry.kinds().count(), 1);
        assert!(registry.extract_images(ResourceKind::Games, &items).is_empty());
    }
}
