//! Authenticated roster request.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, instrument};

use super::error::FetchError;
use super::parser::{Roster, parse_response};
use crate::auth::AuthenticatedSession;
use crate::endpoints::Endpoints;
use crate::http::{HttpRequest, Transport};

/// Reads the shared-location roster for an authenticated session.
pub struct LocationFetcher<'a> {
    transport: &'a dyn Transport,
    endpoints: &'a Endpoints,
}

impl<'a> LocationFetcher<'a> {
    /// Creates a fetcher.
    #[must_use]
    pub fn new(transport: &'a dyn Transport, endpoints: &'a Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Requests and parses the roster.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, a non-200 status, or an
    /// unparseable body. There is no retry.
    #[instrument(level = "debug", skip_all)]
    pub async fn fetch(&self, session: &AuthenticatedSession) -> Result<Roster, FetchError> {
        info!("Requesting shared locations");
        let request = HttpRequest::get(self.endpoints.location_sharing())
            .query("authuser", "0")
            .query("pb", "")
            .header("Cookie", session.cookie_header());

        let response = self.transport.execute(request).await?;
        if response.status != 200 {
            return Err(FetchError::Authorization {
                status: response.status,
            });
        }
        info!("Location request authorized");

        Ok(parse_response(&response.body, unix_now())?)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
