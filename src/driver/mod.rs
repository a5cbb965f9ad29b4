//! Run orchestration: login, roster fetch, output and optional logout.

mod exit;
mod output;
mod watchdog;

use std::io::Write;

use tracing::{error, info, warn};

pub use exit::ProcessExit;
pub use output::{FIELD_SEPARATOR, OutputFormat, format_record, write_records};
pub use watchdog::{DEFAULT_DEADLINE, run_with_watchdog, run_with_watchdog_since};

use crate::auth::{self, AuthPipeline, Credentials};
use crate::endpoints::Endpoints;
use crate::http::Transport;
use crate::locations::LocationFetcher;

/// Per-run behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Log out after the roster was read.
    pub logout: bool,
    /// Record output format.
    pub format: OutputFormat,
}

/// Runs one login + roster read against a transport.
pub struct Driver<'a> {
    transport: &'a dyn Transport,
    endpoints: &'a Endpoints,
    options: DriverOptions,
}

impl<'a> Driver<'a> {
    #[must_use]
    pub fn new(transport: &'a dyn Transport, endpoints: &'a Endpoints, options: DriverOptions) -> Self {
        Self {
            transport,
            endpoints,
            options,
        }
    }

    /// Executes the run, writing records to `out`.
    ///
    /// Every failure is logged here and reported as [`ProcessExit::Failure`];
    /// the watchdog is applied by the caller.
    pub async fn run<W: Write>(&self, credentials: &Credentials, out: &mut W) -> ProcessExit {
        let session = match AuthPipeline::authenticate(self.transport, self.endpoints, credentials)
            .await
        {
            Ok(session) => session,
            Err(auth_error) => {
                error!(
                    stage = %auth_error.stage(),
                    kind = ?auth_error.kind(),
                    error = %auth_error,
                    "Login failed"
                );
                return ProcessExit::Failure;
            }
        };

        let fetched = LocationFetcher::new(self.transport, self.endpoints)
            .fetch(&session)
            .await;

        let exit = match fetched {
            Ok(roster) => {
                if !roster.skipped.is_empty() {
                    warn!(skipped = roster.skipped.len(), "Some roster entries were unreadable");
                }
                info!(records = roster.records.len(), "Roster received");
                match write_records(out, &roster.records, self.options.format) {
                    Ok(()) => ProcessExit::Success,
                    Err(io_error) => {
                        error!(error = %io_error, "Failed to write records");
                        ProcessExit::Failure
                    }
                }
            }
            Err(fetch_error) => {
                error!(error = %fetch_error, "Location request failed");
                ProcessExit::Failure
            }
        };

        if self.options.logout {
            auth::logout(self.transport, self.endpoints, &session).await;
        }

        exit
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse, TransportError};

    struct Scripted {
        responses: Mutex<VecDeque<HttpResponse>>,
        urls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.urls.lock().unwrap().push(request.url.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::client("script exhausted"))
        }
    }

    fn login_responses() -> Vec<HttpResponse> {
        vec![
            HttpResponse::new(200)
                .with_set_cookie("GAPS=g1; Path=/")
                .with_body(r#"<input type="hidden" name="gxf" value="gxf-token">"#),
            HttpResponse::new(200)
                .with_set_cookie("GALX=x1")
                .with_body(
                    r#"<input id="profile-information" name="ProfileInformation" type="hidden" value="pi">
                    <input id="session-state" name="SessionState" type="hidden" value="ss">"#,
                ),
            HttpResponse::new(302)
                .with_set_cookie("SID=s1")
                .with_location("https://accounts.example/CheckCookie"),
            HttpResponse::new(302).with_set_cookie("HSID=h1"),
        ]
    }

    const ROSTER: &str = "PREFIX\n[[[[\"id1\",\"p1\",null,\"Alice\"],[null,[null,12.5,55.1]]],[[\"id2\",\"p2\",null,\"Bob\"],[null,[null,-0.5,51.0]]]]]\nSUFFIX";

    #[tokio::test]
    async fn test_run_emits_one_line_per_record() {
        let mut responses = login_responses();
        responses.push(HttpResponse::new(200).with_body(ROSTER));
        let transport = Scripted::new(responses);
        let endpoints = Endpoints::default();
        let driver = Driver::new(&transport, &endpoints, DriverOptions::default());

        let mut out = Vec::new();
        let exit = driver
            .run(&Credentials::new("me@example.com", "pw"), &mut out)
            .await;

        assert_eq!(exit, ProcessExit::Success);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" , id1 , 55.1 , 12.5 , Alice , p1"), "got: {}", lines[0]);
        assert!(lines[1].contains(" , id2 , 51 , -0.5 , Bob , p2"), "got: {}", lines[1]);
    }

    #[tokio::test]
    async fn test_login_failure_skips_fetch() {
        let transport = Scripted::new(vec![HttpResponse::new(200)]);
        let endpoints = Endpoints::default();
        let driver = Driver::new(&transport, &endpoints, DriverOptions::default());

        let mut out = Vec::new();
        let exit = driver.run(&Credentials::new("me", "pw"), &mut out).await;

        assert_eq!(exit, ProcessExit::Failure);
        assert_eq!(transport.urls().len(), 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_failure_exit() {
        let mut responses = login_responses();
        responses.push(HttpResponse::new(403));
        let transport = Scripted::new(responses);
        let endpoints = Endpoints::default();
        let driver = Driver::new(&transport, &endpoints, DriverOptions::default());

        let mut out = Vec::new();
        let exit = driver.run(&Credentials::new("me", "pw"), &mut out).await;
        assert_eq!(exit, ProcessExit::Failure);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_logout_runs_after_fetch_without_changing_exit() {
        let mut responses = login_responses();
        responses.push(HttpResponse::new(200).with_body(ROSTER));
        responses.push(HttpResponse::new(500));
        let transport = Scripted::new(responses);
        let endpoints = Endpoints::default();
        let options = DriverOptions {
            logout: true,
            format: OutputFormat::Text,
        };
        let driver = Driver::new(&transport, &endpoints, options);

        let mut out = Vec::new();
        let exit = driver.run(&Credentials::new("me", "pw"), &mut out).await;

        assert_eq!(exit, ProcessExit::Success);
        let urls = transport.urls();
        assert_eq!(urls.len(), 6);
        assert_eq!(urls[5], endpoints.logout());
    }
}
