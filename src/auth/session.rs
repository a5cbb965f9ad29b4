//! Per-run session state threaded through the login stages.

use std::fmt;

use super::cookies::CookieJar;
use super::form::SessionForm;

/// Account identifier and secret supplied on the command line.
///
/// The password is redacted in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Account identifier (e-mail address).
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Account secret. Never log the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Mutable state owned by the login pipeline while stages run.
#[derive(Debug, Clone)]
pub struct Session {
    domain: String,
    /// Allow-listed cookies received so far.
    pub cookies: CookieJar,
    /// Hidden form tokens received so far.
    pub form: SessionForm,
    pending_redirect: Option<String>,
}

impl Session {
    /// Creates an empty session tracking cookies for `domain`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            cookies: CookieJar::for_domain(&domain),
            form: SessionForm::new(),
            pending_redirect: None,
            domain,
        }
    }

    /// Cookie-jar domain for this session.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Merges `Set-Cookie` values into this session's domain entries.
    pub fn merge_cookies<S: AsRef<str>>(&mut self, set_cookies: &[S]) {
        self.cookies.merge(&self.domain, set_cookies);
    }

    /// Returns a tracked cookie value for this session's domain (empty when unset).
    #[must_use]
    pub fn cookie(&self, name: &str) -> &str {
        self.cookies.get(&self.domain, name).unwrap_or_default()
    }

    /// Renders the full `Cookie` header for this session's domain.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.cookies.to_header(&self.domain)
    }

    /// Records the redirect target captured after password submission.
    pub fn set_pending_redirect(&mut self, url: impl Into<String>) {
        self.pending_redirect = Some(url.into());
    }

    /// Takes the pending redirect, leaving none behind.
    pub fn take_pending_redirect(&mut self) -> Option<String> {
        self.pending_redirect.take()
    }
}

/// Session state after all login stages succeeded.
///
/// Only exposes the cookie jar, read-only.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    domain: String,
    cookies: CookieJar,
}

impl AuthenticatedSession {
    pub(crate) fn from_session(session: Session) -> Self {
        Self {
            domain: session.domain,
            cookies: session.cookies,
        }
    }

    /// Authenticated cookie jar.
    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Renders the `Cookie` header for authenticated requests.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.cookies.to_header(&self.domain)
    }
}
