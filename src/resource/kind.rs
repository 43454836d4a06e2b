//! The resource kinds the mirror knows about.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error for a resource name that is not a known kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown resource '{name}' (valid resources: {valid})")]
pub struct ResourceParseError {
    /// The name that failed to parse.
    pub name: String,
    /// Comma-separated list of accepted names.
    pub valid: String,
}

/// One category of remote data, named as it appears in the API and on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Accessories,
    Characters,
    Chats,
    Companies,
    Concepts,
    Dlcs,
    Franchises,
    Games,
    GameRatings,
    Genres,
    Locations,
    Objects,
    People,
    Platforms,
    Promos,
    RatingBoards,
    Regions,
    Releases,
    Reviews,
    ProfileImages,
    Themes,
    Types,
    UserReviews,
    VideoCategories,
    VideoShows,
    VideoTypes,
    Videos,
    Articles,
}

impl ResourceKind {
    /// Every kind, in default mirroring order.
    pub const ALL: [ResourceKind; 28] = [
        Self::Accessories,
        Self::Characters,
        Self::Chats,
        Self::Companies,
        Self::Concepts,
        Self::Dlcs,
        Self::Franchises,
        Self::Games,
        Self::GameRatings,
        Self::Genres,
        Self::Locations,
        Self::Objects,
        Self::People,
        Self::Platforms,
        Self::Promos,
        Self::RatingBoards,
        Self::Regions,
        Self::Releases,
        Self::Reviews,
        Self::ProfileImages,
        Self::Themes,
        Self::Types,
        Self::UserReviews,
        Self::VideoCategories,
        Self::VideoShows,
        Self::VideoTypes,
        Self::Videos,
        Self::Articles,
    ];

    /// The resource name used in the API path, include filter and file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accessories => "accessories",
            Self::Characters => "characters",
            Self::Chats => "chats",
            Self::Companies => "companies",
            Self::Concepts => "concepts",
            Self::Dlcs => "dlcs",
            Self::Franchises => "franchises",
            Self::Games => "games",
            Self::GameRatings => "game_ratings",
            Self::Genres => "genres",
            Self::Locations => "locations",
            Self::Objects => "objects",
            Self::People => "people",
            Self::Platforms => "platforms",
            Self::Promos => "promos",
            Self::RatingBoards => "rating_boards",
            Self::Regions => "regions",
            Self::Releases => "releases",
            Self::Reviews => "reviews",
            Self::ProfileImages => "profile_images",
            Self::Themes => "themes",
            Self::Types => "types",
            Self::UserReviews => "user_reviews",
            Self::VideoCategories => "video_categories",
            Self::VideoShows => "video_shows",
            Self::VideoTypes => "video_types",
            Self::Videos => "videos",
            Self::Articles => "articles",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ResourceParseError {
                name: s.trim().to_string(),
                valid: Self::ALL
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Parses a comma-separated include filter.
///
/// Blank entries are ignored and repeated kinds keep their first position.
/// An empty filter yields an empty list, which the orchestrator reads as
/// "every kind".
///
/// # Errors
///
/// Returns [`ResourceParseError`] for the first unknown name.
pub fn parse_include_list(input: &str) -> Result<Vec<ResourceKind>, ResourceParseError> {
    let mut kinds: Vec<ResourceKind> = Vec::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let kind = entry.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_for_every_kind() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_and_whitespace_tolerant() {
        assert_eq!(
            " Video_Shows ".parse::<ResourceKind>().unwrap(),
            ResourceKind::VideoShows
        );
    }

    #[test]
    fn test_parse_unknown_lists_valid_names() {
        let error = "gamez".parse::<ResourceKind>().unwrap_err();
        assert_eq!(error.name, "gamez");
        assert!(error.to_string().contains("games"));
    }

    #[test]
    fn test_parse_include_list_dedups_and_keeps_order() {
        let kinds = parse_include_list("people, games,,people ,types").unwrap();
        assert_eq!(
            kinds,
            vec![ResourceKind::People, ResourceKind::Games, ResourceKind::Types]
        );
    }

    #[test]
    fn test_parse_include_list_rejects_unknown() {
        assert!(parse_include_list("games,nope").is_err());
    }

    #[test]
    fn test_parse_include_list_empty_is_empty() {
        assert!(parse_include_list(" , ").unwrap().is_empty());
    }
}
