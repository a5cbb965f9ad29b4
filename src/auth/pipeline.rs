//! Sequential login state machine.
//!
//! The pipeline owns the [`Session`] for the run and drives the four stages
//! in order. The first failing stage ends the run in [`AuthState::Failed`];
//! there is no retry.

use tracing::{error, info, instrument};

use super::error::{AuthError, AuthStage};
use super::session::{AuthenticatedSession, Credentials, Session};
use super::stages::StageRunner;
use crate::endpoints::{Endpoints, LOCATOR_DOMAIN};
use crate::http::Transport;

/// Pipeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// The given stage is next to run.
    Pending(AuthStage),
    /// All stages completed.
    Authenticated,
    /// The given stage failed; terminal.
    Failed(AuthStage),
}

/// Drives the login stages against a transport.
pub struct AuthPipeline<'a> {
    runner: StageRunner<'a>,
    session: Session,
    state: AuthState,
}

impl<'a> AuthPipeline<'a> {
    /// Creates a pipeline with a fresh session for the provider domain.
    #[must_use]
    pub fn new(
        transport: &'a dyn Transport,
        endpoints: &'a Endpoints,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            runner: StageRunner::new(transport, endpoints, credentials),
            session: Session::new(LOCATOR_DOMAIN),
            state: AuthState::Pending(AuthStage::Initial),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Session state accumulated so far.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs the pending stage, if any, and returns the new state.
    ///
    /// Terminal states are returned unchanged without sending a request.
    ///
    /// # Errors
    ///
    /// Returns the stage's [`AuthError`]; the state becomes
    /// [`AuthState::Failed`].
    pub async fn step(&mut self) -> Result<AuthState, AuthError> {
        let AuthState::Pending(stage) = self.state else {
            return Ok(self.state);
        };

        match self.runner.run(stage, &mut self.session).await {
            Ok(()) => {
                info!(stage = stage.number(), "Stage complete");
                self.state = stage.next().map_or(AuthState::Authenticated, AuthState::Pending);
                Ok(self.state)
            }
            Err(err) => {
                error!(stage = stage.number(), error = %err, "Login stage failed");
                self.state = AuthState::Failed(stage);
                Err(err)
            }
        }
    }

    /// Runs every stage on a fresh pipeline and hands back the authenticated session.
    ///
    /// Stage N+1 starts only after stage N's cookies and tokens are stored.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the first stage that fails.
    pub async fn authenticate(
        transport: &'a dyn Transport,
        endpoints: &'a Endpoints,
        credentials: &'a Credentials,
    ) -> Result<AuthenticatedSession, AuthError> {
        Self::new(transport, endpoints, credentials)
            .run_to_completion()
            .await
    }

    #[instrument(level = "debug", skip_all)]
    async fn run_to_completion(mut self) -> Result<AuthenticatedSession, AuthError> {
        // From a fresh pipeline `step` only yields `Pending` or `Authenticated`;
        // a failing stage surfaces through `?` with its own error.
        while let AuthState::Pending(_) = self.step().await? {}
        info!("Authentication successful");
        Ok(AuthenticatedSession::from_session(self.session))
    }
}
