//! Best-effort session logout.

use tracing::{info, instrument, warn};

use super::session::AuthenticatedSession;
use crate::endpoints::Endpoints;
use crate::http::{HttpRequest, Transport};

/// Ends the provider session.
///
/// Returns `true` when the provider acknowledged with HTTP 200. Failures are
/// logged and never propagated.
#[instrument(level = "debug", skip_all)]
pub async fn logout(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    session: &AuthenticatedSession,
) -> bool {
    info!("Logging out");
    let request = HttpRequest::get(endpoints.logout()).header("Cookie", session.cookie_header());

    match transport.execute(request).await {
        Ok(response) if response.status == 200 => {
            info!("Logged out");
            true
        }
        Ok(response) => {
            warn!(status = response.status, "Logout returned unexpected status");
            false
        }
        Err(error) => {
            warn!(error = %error, "Logout request failed");
            false
        }
    }
}
