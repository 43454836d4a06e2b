//! Image URL normalization.
//!
//! Images have been served from several CDN hosts and scale paths over the
//! years. Before download, each URL is pushed through an ordered list of
//! [`RewriteRule`]s and then checked against the accepted upload prefixes.

use super::variants::{ORIGINAL_SCALE, REDUCED_SCALES};

/// Canonical prefix every upload lives under, followed by a scale segment.
pub const CANONICAL_UPLOAD_PREFIX: &str = "https://www.giantbomb.com/a/uploads/";

/// Canonical prefix of full-resolution uploads.
pub const ORIGINAL_UPLOAD_PREFIX: &str = "https://www.giantbomb.com/a/uploads/original/";

/// Prefixes an image URL must start with (after rewriting) to be downloaded.
pub const ACCEPTED_PREFIXES: [&str; 2] = [
    ORIGINAL_UPLOAD_PREFIX,
    "https://giantbomb.com/a/uploads/original/",
];

const CANONICAL_ASSET_ROOT: &str = "https://www.giantbomb.com/a/";

const ALTERNATE_HOSTS: [&str; 2] = [
    "https://static.giantbomb.com/",
    "https://giantbomb1.cbsistatic.com/",
];

const UPLOAD_HOSTS: [&str; 2] = ["https://www.giantbomb.com", "https://giantbomb.com"];

/// One substring substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    matcher: String,
    replacement: String,
}

impl RewriteRule {
    /// Creates a rule replacing every occurrence of `matcher` with `replacement`.
    pub fn new(matcher: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            replacement: replacement.into(),
        }
    }

    /// Applies the rule, returning `None` when the matcher does not occur.
    #[must_use]
    pub fn apply(&self, url: &str) -> Option<String> {
        url.contains(&self.matcher)
            .then(|| url.replace(&self.matcher, &self.replacement))
    }
}

/// Ordered rewrite rules plus the accepted-prefix whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRewriter {
    rules: Vec<RewriteRule>,
    accepted_prefixes: Vec<String>,
}

impl Default for UrlRewriter {
    fn default() -> Self {
        let host_rules = ALTERNATE_HOSTS
            .iter()
            .map(|host| RewriteRule::new(*host, CANONICAL_ASSET_ROOT));
        let scale_rules = UPLOAD_HOSTS.iter().flat_map(|host| {
            REDUCED_SCALES.iter().map(move |scale| {
                RewriteRule::new(
                    format!("{host}/a/uploads/{scale}/"),
                    format!("{CANONICAL_UPLOAD_PREFIX}{ORIGINAL_SCALE}/"),
                )
            })
        });

        Self {
            rules: host_rules.chain(scale_rules).collect(),
            accepted_prefixes: ACCEPTED_PREFIXES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl UrlRewriter {
    /// Creates a rewriter from explicit rules and prefixes.
    #[must_use]
    pub fn new(rules: Vec<RewriteRule>, accepted_prefixes: Vec<String>) -> Self {
        Self {
            rules,
            accepted_prefixes,
        }
    }

    /// Adds another accepted prefix, checked after the existing ones.
    #[must_use]
    pub fn with_accepted_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.accepted_prefixes.push(prefix.into());
        self
    }

    /// Returns the rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Applies every rule in order; each rule sees the output of the previous ones.
    #[must_use]
    pub fn rewrite(&self, url: &str) -> String {
        self.rules
            .iter()
            .fold(url.to_string(), |current, rule| {
                rule.apply(&current).unwrap_or(current)
            })
    }

    /// Returns the first accepted prefix `url` starts with.
    #[must_use]
    pub fn accepted_prefix(&self, url: &str) -> Option<&str> {
        self.accepted_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| url.starts_with(prefix))
    }
}
