//! Login stages and the errors that end the login flow.

use std::fmt;

use thiserror::Error;

use crate::http::TransportError;

/// The four login exchanges, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthStage {
    /// Stage 1: fetch the login entry page.
    Initial,
    /// Stage 2: submit the account identifier.
    EmailSubmitted,
    /// Stage 3: submit the password.
    PasswordSubmitted,
    /// Stage 4: follow the post-login redirect.
    Redirected,
}

impl AuthStage {
    /// 1-based stage number.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Initial => 1,
            Self::EmailSubmitted => 2,
            Self::PasswordSubmitted => 3,
            Self::Redirected => 4,
        }
    }

    /// The stage that follows this one, or `None` after the last stage.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Initial => Some(Self::EmailSubmitted),
            Self::EmailSubmitted => Some(Self::PasswordSubmitted),
            Self::PasswordSubmitted => Some(Self::Redirected),
            Self::Redirected => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Initial => "login page",
            Self::EmailSubmitted => "identifier lookup",
            Self::PasswordSubmitted => "password challenge",
            Self::Redirected => "post-login redirect",
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.label())
    }
}

/// Coarse failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was obtained.
    Transport,
    /// A response arrived with the wrong status code.
    Authorization,
    /// An expected cookie, header or form field was absent.
    Extraction,
}

/// Errors that stop the login flow at a specific stage.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The exchange produced no response.
    #[error("{stage} failed: {source}")]
    Transport {
        /// Stage that failed.
        stage: AuthStage,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The provider answered with an unexpected status code.
    #[error("{stage} failed: expected HTTP {expected}, got HTTP {actual}")]
    Authorization {
        /// Stage that failed.
        stage: AuthStage,
        /// Status the stage requires.
        expected: u16,
        /// Status actually received.
        actual: u16,
    },

    /// A value the stage needs was missing from the response or session.
    #[error("{stage} failed: {what} not found")]
    Extraction {
        /// Stage that failed.
        stage: AuthStage,
        /// Description of the missing value.
        what: String,
    },
}

impl AuthError {
    /// Creates a transport failure.
    pub fn transport(stage: AuthStage, source: TransportError) -> Self {
        Self::Transport { stage, source }
    }

    /// Creates a wrong-status failure.
    pub fn authorization(stage: AuthStage, expected: u16, actual: u16) -> Self {
        Self::Authorization {
            stage,
            expected,
            actual,
        }
    }

    /// Creates a missing-value failure.
    pub fn extraction(stage: AuthStage, what: impl Into<String>) -> Self {
        Self::Extraction {
            stage,
            what: what.into(),
        }
    }

    /// Stage at which the flow stopped.
    #[must_use]
    pub fn stage(&self) -> AuthStage {
        match self {
            Self::Transport { stage, .. }
            | Self::Authorization { stage, .. }
            | Self::Extraction { stage, .. } => *stage,
        }
    }

    /// Failure category.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Transport,
            Self::Authorization { .. } => FailureKind::Authorization,
            Self::Extraction { .. } => FailureKind::Extraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_numbers() {
        let numbers: Vec<u8> =
            std::iter::successors(Some(AuthStage::Initial), |stage| stage.next())
                .map(AuthStage::number)
                .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(AuthStage::Initial.next(), Some(AuthStage::EmailSubmitted));
        assert_eq!(AuthStage::Redirected.next(), None);
        assert!(AuthStage::Initial < AuthStage::Redirected);
    }

    #[test]
    fn test_authorization_display_names_stage_and_statuses() {
        let error = AuthError::authorization(AuthStage::PasswordSubmitted, 302, 200);
        let msg = error.to_string();
        assert!(msg.contains("stage 3"), "got: {msg}");
        assert!(msg.contains("302"), "got: {msg}");
        assert!(msg.contains("200"), "got: {msg}");
        assert_eq!(error.kind(), FailureKind::Authorization);
        assert_eq!(error.stage(), AuthStage::PasswordSubmitted);
    }

    #[test]
    fn test_extraction_display() {
        let error = AuthError::extraction(AuthStage::Initial, "hidden field `gxf`");
        assert_eq!(
            error.to_string(),
            "stage 1 (login page) failed: hidden field `gxf` not found"
        );
        assert_eq!(error.kind(), FailureKind::Extraction);
    }

    #[test]
    fn test_transport_kind() {
        let error = AuthError::transport(AuthStage::Redirected, TransportError::invalid_url("x"));
        assert_eq!(error.kind(), FailureKind::Transport);
        assert_eq!(error.stage(), AuthStage::Redirected);
    }
}
