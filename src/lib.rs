//! Locshare Core Library
//!
//! Signs in to a Google account through the no-JavaScript login flow and
//! reads the roster of people sharing their location with that account.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`http`] - Transport seam and the reqwest-backed client (manual redirects)
//! - [`endpoints`] - Provider base URLs and request paths
//! - [`auth`] - Cookie jar, hidden-field extraction and the four-stage login
//! - [`locations`] - Roster request and positional response parsing
//! - [`driver`] - Run orchestration, record output and the watchdog

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod driver;
pub mod endpoints;
pub mod http;
pub mod locations;
mod user_agent;

// Re-export commonly used types
pub use auth::{
    AuthError, AuthPipeline, AuthStage, AuthState, AuthenticatedSession, CookieJar, Credentials,
    FailureKind, TRACKED_COOKIES,
};
pub use driver::{
    DEFAULT_DEADLINE, Driver, DriverOptions, OutputFormat, ProcessExit, run_with_watchdog,
    run_with_watchdog_since,
};
pub use endpoints::Endpoints;
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use locations::{FetchError, LocationFetcher, LocationRecord, ParseError, Roster};
pub use user_agent::BROWSER_USER_AGENT;
