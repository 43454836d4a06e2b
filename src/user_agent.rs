//! Identifying User-Agent for API, site and image traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/gb-api-mirror";

/// Default User-Agent for every request the mirror sends.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gb-api-mirror/{version} (+{PROJECT_UA_URL})")
}
