//! Error types for roster retrieval and parsing.

use thiserror::Error;

use crate::http::TransportError;

/// Errors that fail the whole roster response.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body has no interior lines between the framing lines.
    #[error("response has {lines} line(s); expected framing lines around a JSON payload")]
    MissingPayload {
        /// Number of lines found.
        lines: usize,
    },

    /// The interior lines are not valid JSON.
    #[error("response payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but not an array.
    #[error("response payload is not a JSON array")]
    NotAnArray,
}

/// A single roster entry missing an expected position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {index}: {field} missing or not a {expected} at {path}")]
pub struct RecordError {
    /// Position of the record in the roster.
    pub index: usize,
    /// Name of the field being extracted.
    pub field: &'static str,
    /// Positional path inside the record, e.g. `[1][1][2]`.
    pub path: &'static str,
    /// Expected JSON type.
    pub expected: &'static str,
}

/// Errors from the authenticated roster request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No response was obtained.
    #[error("location request failed: {0}")]
    Transport(#[from] TransportError),

    /// The endpoint rejected the session.
    #[error("location request returned HTTP {status}; session not authorized")]
    Authorization {
        /// Status received.
        status: u16,
    },

    /// The response could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
