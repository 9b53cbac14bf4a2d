//! Shared User-Agent string for remote store traffic.
//!
//! Single source for project URL and UA format so every request identifies the
//! client the same way.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/bookshelf";

/// Default User-Agent for catalog and borrow requests.
#[must_use]
pub(crate) fn default_store_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bookshelf/{version} (library-client; +{PROJECT_UA_URL})")
}
