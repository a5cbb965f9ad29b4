//! Shared-location roster retrieval and parsing.
//!
//! The roster endpoint answers with a JSON array wrapped in non-JSON first and
//! last lines. Each subject is a nested array whose fields are read by fixed
//! position; see [`parse_response`].

mod error;
mod fetcher;
mod parser;

pub use error::{FetchError, ParseError, RecordError};
pub use fetcher::LocationFetcher;
pub use parser::{Roster, parse_payload, parse_record, parse_response, strip_framing};

use serde::Serialize;

/// One subject's last reported position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    /// Seconds since the Unix epoch at which the roster was parsed.
    pub captured_at: u64,
    /// Provider identifier of the subject.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Profile photo URL.
    pub photo_url: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}
