//! User-Agent string for login and data requests.
//!
//! The login pages serve the no-JavaScript form variant only to clients that
//! look like a desktop browser, so every request uses the same browser UA.

/// Desktop browser User-Agent sent on every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Returns the User-Agent used by the default transport.
#[must_use]
pub(crate) fn browser_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
