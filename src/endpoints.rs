//! Provider endpoint layout.
//!
//! Base URLs are configurable so tests can point the whole flow at a mock
//! server; paths are fixed by the provider.

/// Default accounts (login) origin.
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.google.com";

/// Default maps origin serving the location-sharing endpoint.
pub const DEFAULT_MAPS_URL: &str = "https://www.google.com";

/// Cookie-jar domain under which session cookies are tracked.
pub const LOCATOR_DOMAIN: &str = "google.com";

const SERVICE_LOGIN_PATH: &str = "/ServiceLogin";
const LOOKUP_PATH: &str = "/signin/v1/lookup";
const PASSWORD_CHALLENGE_PATH: &str = "/signin/challenge/sl/password";
const LOGOUT_PATH: &str = "/logout";
const LOCATION_SHARING_PATH: &str = "/maps/preview/locationsharing/read";

/// Base URLs for the accounts and maps hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    accounts_base: String,
    maps_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base_urls(DEFAULT_ACCOUNTS_URL, DEFAULT_MAPS_URL)
    }
}

impl Endpoints {
    /// Creates endpoints with custom base URLs (trailing slashes are ignored).
    #[must_use]
    pub fn with_base_urls(accounts_base: impl Into<String>, maps_base: impl Into<String>) -> Self {
        Self {
            accounts_base: accounts_base.into().trim_end_matches('/').to_string(),
            maps_base: maps_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Accounts origin, used for `Origin` headers and relative redirects.
    #[must_use]
    pub fn accounts_base(&self) -> &str {
        &self.accounts_base
    }

    /// Login entry point (stage 1).
    #[must_use]
    pub fn service_login(&self) -> String {
        format!("{}{SERVICE_LOGIN_PATH}", self.accounts_base)
    }

    /// Identifier lookup (stage 2).
    #[must_use]
    pub fn lookup(&self) -> String {
        format!("{}{LOOKUP_PATH}", self.accounts_base)
    }

    /// Password challenge (stage 3).
    #[must_use]
    pub fn password_challenge(&self) -> String {
        format!("{}{PASSWORD_CHALLENGE_PATH}", self.accounts_base)
    }

    /// Session logout.
    #[must_use]
    pub fn logout(&self) -> String {
        format!("{}{LOGOUT_PATH}", self.accounts_base)
    }

    /// Shared-location roster read.
    #[must_use]
    pub fn location_sharing(&self) -> String {
        format!("{}{LOCATION_SHARING_PATH}", self.maps_base)
    }
}
