//! Allow-listed session cookie jar.
//!
//! Only a fixed set of session and security cookie names is tracked per
//! domain. `Set-Cookie` attributes (expiry, path, flags) are ignored and the
//! last value received for a name wins.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, instrument, trace};

/// Cookie names tracked by the jar, in `Cookie` header rendering order.
pub const TRACKED_COOKIES: [&str; 13] = [
    "GAPS",
    "GALX",
    "SID",
    "LSID",
    "SIDCC",
    "HSID",
    "SSID",
    "APISID",
    "SAPISID",
    "ACCOUNT_CHOOSER",
    "NID",
    "CONSENT",
    "1P_JAR",
];

/// Allow-listed cookie values for one domain, indexed like [`TRACKED_COOKIES`].
#[derive(Clone, Default, PartialEq, Eq)]
struct DomainCookies {
    values: [String; TRACKED_COOKIES.len()],
}

impl DomainCookies {
    fn slot(name: &str) -> Option<usize> {
        TRACKED_COOKIES.iter().position(|tracked| *tracked == name)
    }

    fn render(&self) -> String {
        TRACKED_COOKIES
            .iter()
            .zip(&self.values)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Per-domain jar restricted to [`TRACKED_COOKIES`].
///
/// Cookie values are redacted in `Debug` output.
#[derive(Clone, Default)]
pub struct CookieJar {
    domains: HashMap<String, DomainCookies>,
}

impl CookieJar {
    /// Creates a jar with an empty entry set for `domain`.
    #[must_use]
    pub fn for_domain(domain: &str) -> Self {
        let mut domains = HashMap::new();
        domains.insert(domain.to_string(), DomainCookies::default());
        Self { domains }
    }

    /// Merges `Set-Cookie` header values into the entries for `domain`.
    ///
    /// The `name=value` pair is taken from the text before the first `;` and
    /// split on the first `=`, so values may themselves contain `=`. Names
    /// outside the allow-list and pairs without `=` are ignored.
    #[instrument(level = "debug", skip(self, set_cookies), fields(count = set_cookies.len()))]
    pub fn merge<S: AsRef<str>>(&mut self, domain: &str, set_cookies: &[S]) {
        let entries = self.domains.entry(domain.to_string()).or_default();
        let mut stored = 0usize;

        for header in set_cookies {
            let Some((name, value)) = parse_set_cookie_pair(header.as_ref()) else {
                trace!("ignoring Set-Cookie header without a name=value pair");
                continue;
            };
            match DomainCookies::slot(name) {
                Some(index) => {
                    entries.values[index] = value.to_string();
                    stored += 1;
                    trace!(name, "stored tracked cookie");
                }
                None => trace!(name, "ignoring untracked cookie"),
            }
        }

        debug!(stored, "merged cookies");
    }

    /// Returns the stored value of a tracked cookie.
    ///
    /// Returns `None` for unknown domains and untracked names; tracked names
    /// that have not been set yet return `Some("")`.
    #[must_use]
    pub fn get(&self, domain: &str, name: &str) -> Option<&str> {
        let entries = self.domains.get(domain)?;
        DomainCookies::slot(name).map(|index| entries.values[index].as_str())
    }

    /// Renders every tracked entry for `domain` as a `Cookie` header value.
    ///
    /// Entries that are still empty are rendered as `name=`. An unknown domain
    /// renders as if all entries were empty.
    #[must_use]
    pub fn to_header(&self, domain: &str) -> String {
        self.domains
            .get(domain)
            .map_or_else(|| DomainCookies::default().render(), DomainCookies::render)
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (domain, entries) in &self.domains {
            let set: Vec<&str> = TRACKED_COOKIES
                .iter()
                .zip(&entries.values)
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, _)| *name)
                .collect();
            map.entry(domain, &set);
        }
        map.finish()
    }
}

/// Splits the leading `name=value` pair out of a `Set-Cookie` header value.
fn parse_set_cookie_pair(header: &str) -> Option<(&str, &str)> {
    let pair = header.split(';').next().unwrap_or_default();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}
