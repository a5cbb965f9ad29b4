//! One HTTP exchange per login stage.
//!
//! Each stage checks its preconditions against the [`Session`], performs its
//! exchange, validates status and `Set-Cookie` presence, merges cookies and
//! stores whatever later stages need. Any missing value fails the stage with
//! an [`AuthError`]; nothing here panics on malformed responses.

use tracing::{debug, info, instrument};
use url::Url;

use super::error::{AuthError, AuthStage};
use super::extract::hidden_field;
use super::form::FormField;
use super::session::{Credentials, Session};
use crate::endpoints::Endpoints;
use crate::http::{HttpRequest, HttpResponse, Transport};

const STATUS_OK: u16 = 200;
const STATUS_FOUND: u16 = 302;

const PAGE: &str = "PasswordSeparationSignIn";
const BG_RESPONSE: &str = "js_disabled";
const CHECKED_DOMAINS: &str = "youtube";
const SIGN_IN_LABEL: &str = "Weiter";

/// Security-challenge cookie required by the password stage.
const CHALLENGE_COOKIE: &str = "GALX";
/// Cookie sent alone on the identifier lookup.
const LOGIN_COOKIE: &str = "GAPS";

/// Runs individual login stages against a transport.
pub struct StageRunner<'a> {
    transport: &'a dyn Transport,
    endpoints: &'a Endpoints,
    credentials: &'a Credentials,
}

impl<'a> StageRunner<'a> {
    /// Creates a runner.
    #[must_use]
    pub fn new(
        transport: &'a dyn Transport,
        endpoints: &'a Endpoints,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            transport,
            endpoints,
            credentials,
        }
    }

    /// Runs `stage`, applying its side effects to `session` on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the stage's preconditions, status check or
    /// extraction fail, or when no response was obtained.
    pub async fn run(&self, stage: AuthStage, session: &mut Session) -> Result<(), AuthError> {
        match stage {
            AuthStage::Initial => self.open_login_page(session).await,
            AuthStage::EmailSubmitted => self.submit_identifier(session).await,
            AuthStage::PasswordSubmitted => self.submit_password(session).await,
            AuthStage::Redirected => self.follow_redirect(session).await,
        }
    }

    /// Stage 1: fetch the no-JavaScript login page and harvest `gxf`.
    #[instrument(level = "debug", skip_all, fields(stage = 1))]
    async fn open_login_page(&self, session: &mut Session) -> Result<(), AuthError> {
        let stage = AuthStage::Initial;
        info!("Connecting to login page");

        let request = HttpRequest::get(self.endpoints.service_login())
            .query("rip", "1")
            .query("nojavascript", "1");
        let response = self.exchange(stage, request, STATUS_OK).await?;

        session.merge_cookies(&response.set_cookies);
        let gxf = require_hidden_field(stage, &response.body, FormField::Gxf)?;
        session.form.set(FormField::Gxf, gxf);

        debug!("Saved login page cookies and gxf token");
        Ok(())
    }

    /// Stage 2: submit the account identifier and harvest the profile tokens.
    #[instrument(level = "debug", skip_all, fields(stage = 2))]
    async fn submit_identifier(&self, session: &mut Session) -> Result<(), AuthError> {
        let stage = AuthStage::EmailSubmitted;
        info!("Submitting account identifier");

        let gxf = require_form_value(stage, session, FormField::Gxf)?;
        let form = vec![
            ("Page", PAGE.to_string()),
            ("gxf", gxf),
            ("rip", "1".to_string()),
            ("ProfileInformation", String::new()),
            ("SessionState", String::new()),
            ("bgresponse", BG_RESPONSE.to_string()),
            ("pstMsg", "0".to_string()),
            ("checkConnection", String::new()),
            ("checkedDomains", CHECKED_DOMAINS.to_string()),
            ("Email", self.credentials.email().to_string()),
            ("identifiertoken", String::new()),
            ("identifiertoken_audio", String::new()),
            ("identifier-captcha-input", String::new()),
            ("signIn", SIGN_IN_LABEL.to_string()),
            ("Passwd", String::new()),
            ("PersistentCookie", "yes".to_string()),
        ];
        let request = HttpRequest::post(self.endpoints.lookup())
            .header("Cookie", format!("{LOGIN_COOKIE}={}", session.cookie(LOGIN_COOKIE)))
            .form(form);
        let response = self.exchange(stage, request, STATUS_OK).await?;

        session.merge_cookies(&response.set_cookies);
        let profile = require_hidden_field(stage, &response.body, FormField::ProfileInformation)?;
        let state = require_hidden_field(stage, &response.body, FormField::SessionState)?;
        session.form.set(FormField::ProfileInformation, profile);
        session.form.set(FormField::SessionState, state);

        debug!("Saved identifier lookup cookies and profile tokens");
        Ok(())
    }

    /// Stage 3: submit the password; success is a redirect.
    #[instrument(level = "debug", skip_all, fields(stage = 3))]
    async fn submit_password(&self, session: &mut Session) -> Result<(), AuthError> {
        let stage = AuthStage::PasswordSubmitted;
        info!("Submitting password");

        let profile = require_form_value(stage, session, FormField::ProfileInformation)?;
        let state = require_form_value(stage, session, FormField::SessionState)?;
        let gxf = require_form_value(stage, session, FormField::Gxf)?;
        let galx = session.cookie(CHALLENGE_COOKIE).to_string();
        if galx.is_empty() {
            return Err(AuthError::extraction(
                stage,
                format!("cookie `{CHALLENGE_COOKIE}`"),
            ));
        }

        let cookie = format!(
            "{LOGIN_COOKIE}={}; {CHALLENGE_COOKIE}={galx}",
            session.cookie(LOGIN_COOKIE)
        );
        let form = vec![
            ("Page", PAGE.to_string()),
            ("GALX", galx),
            ("gxf", gxf),
            ("checkedDomains", CHECKED_DOMAINS.to_string()),
            ("pstMsg", "0".to_string()),
            ("rip", "1".to_string()),
            ("ProfileInformation", profile),
            ("SessionState", state),
            ("_utf8", "\u{2603}".to_string()),
            ("bgresponse", BG_RESPONSE.to_string()),
            ("checkConnection", String::new()),
            ("Email", self.credentials.email().to_string()),
            ("signIn", SIGN_IN_LABEL.to_string()),
            ("Passwd", self.credentials.password().to_string()),
            ("PersistentCookie", "yes".to_string()),
            ("rmShown", "1".to_string()),
        ];
        let request = HttpRequest::post(self.endpoints.password_challenge())
            .header("Cookie", cookie)
            .header("Origin", self.endpoints.accounts_base())
            .header("Referer", self.endpoints.lookup())
            .header("Upgrade-Insecure-Requests", "1")
            .form(form);
        let response = self.exchange(stage, request, STATUS_FOUND).await?;

        session.merge_cookies(&response.set_cookies);
        let location = response
            .location
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AuthError::extraction(stage, "`Location` header"))?;
        let target = resolve_location(self.endpoints.accounts_base(), location)
            .ok_or_else(|| AuthError::extraction(stage, "valid `Location` URL"))?;
        session.set_pending_redirect(target);

        info!("Password accepted; received redirect location");
        Ok(())
    }

    /// Stage 4: post to the captured redirect with the full cookie header.
    #[instrument(level = "debug", skip_all, fields(stage = 4))]
    async fn follow_redirect(&self, session: &mut Session) -> Result<(), AuthError> {
        let stage = AuthStage::Redirected;
        let target = session
            .take_pending_redirect()
            .ok_or_else(|| AuthError::extraction(stage, "pending redirect"))?;
        info!(url = %target, "Following post-login redirect");

        let request = HttpRequest::post(target).header("Cookie", session.cookie_header());
        let response = self.exchange(stage, request, STATUS_FOUND).await?;

        session.merge_cookies(&response.set_cookies);
        debug!("Saved post-login cookies");
        Ok(())
    }

    /// Sends `request` and checks the status code and `Set-Cookie` presence.
    async fn exchange(
        &self,
        stage: AuthStage,
        request: HttpRequest,
        expected_status: u16,
    ) -> Result<HttpResponse, AuthError> {
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|error| AuthError::transport(stage, error))?;

        debug!(status = response.status, "stage response received");
        if response.status != expected_status {
            return Err(AuthError::authorization(
                stage,
                expected_status,
                response.status,
            ));
        }
        if !response.has_cookies() {
            return Err(AuthError::extraction(stage, "`Set-Cookie` header"));
        }
        Ok(response)
    }
}

fn require_hidden_field(
    stage: AuthStage,
    html: &str,
    field: FormField,
) -> Result<String, AuthError> {
    hidden_field(html, field)
        .map(str::to_string)
        .ok_or_else(|| AuthError::extraction(stage, format!("hidden field `{field}`")))
}

fn require_form_value(
    stage: AuthStage,
    session: &Session,
    field: FormField,
) -> Result<String, AuthError> {
    let value = session.form.get(field);
    if value.is_empty() {
        return Err(AuthError::extraction(
            stage,
            format!("session token `{field}`"),
        ));
    }
    Ok(value.to_string())
}

/// Resolves a possibly relative `Location` value against the accounts origin.
fn resolve_location(base: &str, location: &str) -> Option<String> {
    if let Ok(url) = Url::parse(location) {
        return Some(url.to_string());
    }
    Url::parse(base)
        .ok()?
        .join(location)
        .ok()
        .map(|url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_location_absolute_kept() {
        assert_eq!(
            resolve_location(
                "https://accounts.google.com",
                "https://accounts.google.com/CheckCookie?continue=x"
            )
            .unwrap(),
            "https://accounts.google.com/CheckCookie?continue=x"
        );
    }

    #[test]
    fn test_resolve_location_relative_joined() {
        assert_eq!(
            resolve_location("http://127.0.0.1:4000", "/CheckCookie?chtml=LoginDoneHtml").unwrap(),
            "http://127.0.0.1:4000/CheckCookie?chtml=LoginDoneHtml"
        );
    }

    #[test]
    fn test_require_form_value_empty_is_extraction_failure() {
        let session = Session::new("google.com");
        let error = require_form_value(AuthStage::EmailSubmitted, &session, FormField::Gxf)
            .unwrap_err();
        assert_eq!(error.stage(), AuthStage::EmailSubmitted);
        assert!(error.to_string().contains("gxf"));
    }

    #[test]
    fn test_require_hidden_field_missing_names_field() {
        let error =
            require_hidden_field(AuthStage::Initial, "<html></html>", FormField::Gxf).unwrap_err();
        assert!(error.to_string().contains("hidden field `gxf`"), "got: {error}");
    }
}
