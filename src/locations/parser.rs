//! Positional parsing of the location-sharing response.

use serde_json::Value;
use tracing::{debug, warn};

use super::LocationRecord;
use super::error::{ParseError, RecordError};

/// Parsed roster: valid records plus the entries that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    /// Records extracted successfully, in roster order.
    pub records: Vec<LocationRecord>,
    /// Entries missing an expected position.
    pub skipped: Vec<RecordError>,
}

/// Drops the first and last line of `body` and joins the rest.
///
/// # Errors
///
/// Returns [`ParseError::MissingPayload`] when fewer than three lines exist.
pub fn strip_framing(body: &str) -> Result<String, ParseError> {
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() < 3 {
        return Err(ParseError::MissingPayload { lines: lines.len() });
    }
    Ok(lines[1..lines.len() - 1].concat())
}

/// Parses a framed response body.
///
/// Every record receives `captured_at` as its timestamp.
///
/// # Errors
///
/// Returns [`ParseError`] when the framing or JSON is invalid. Malformed
/// individual records are reported in [`Roster::skipped`] instead.
pub fn parse_response(body: &str, captured_at: u64) -> Result<Roster, ParseError> {
    let payload = strip_framing(body)?;
    let value: Value = serde_json::from_str(&payload)?;
    parse_payload(&value, captured_at)
}

/// Maps an already-decoded payload to records.
///
/// Element 0 of the top-level array holds the per-subject entries; when it is
/// absent, `null` or empty the roster is empty.
///
/// # Errors
///
/// Returns [`ParseError::NotAnArray`] when the payload is not a JSON array.
pub fn parse_payload(value: &Value, captured_at: u64) -> Result<Roster, ParseError> {
    let top = value.as_array().ok_or(ParseError::NotAnArray)?;

    let entries = match top.first() {
        None | Some(Value::Null) => return Ok(Roster::default()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            warn!("Roster element is not an array; treating as empty");
            return Ok(Roster::default());
        }
    };

    let mut roster = Roster::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_record(entry, index, captured_at) {
            Ok(record) => roster.records.push(record),
            Err(error) => {
                warn!(error = %error, "Skipping malformed roster entry");
                roster.skipped.push(error);
            }
        }
    }
    debug!(
        records = roster.records.len(),
        skipped = roster.skipped.len(),
        "Parsed roster"
    );
    Ok(roster)
}

/// Extracts one subject from its nested-array entry.
///
/// Layout: `[0][0]` id, `[0][1]` photo URL, `[0][3]` name, `[1][1][1]`
/// longitude, `[1][1][2]` latitude. Position `[0][2]` is unused.
///
/// # Errors
///
/// Returns [`RecordError`] naming the first missing position.
pub fn parse_record(
    entry: &Value,
    index: usize,
    captured_at: u64,
) -> Result<LocationRecord, RecordError> {
    let id = string_at(entry, index, "id", "/0/0", "[0][0]")?;
    let photo_url = string_at(entry, index, "photo_url", "/0/1", "[0][1]")?;
    let name = string_at(entry, index, "name", "/0/3", "[0][3]")?;
    let longitude = number_at(entry, index, "longitude", "/1/1/1", "[1][1][1]")?;
    let latitude = number_at(entry, index, "latitude", "/1/1/2", "[1][1][2]")?;

    Ok(LocationRecord {
        captured_at,
        id,
        name,
        photo_url,
        latitude,
        longitude,
    })
}

fn string_at(
    entry: &Value,
    index: usize,
    field: &'static str,
    pointer: &str,
    path: &'static str,
) -> Result<String, RecordError> {
    entry
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(RecordError {
            index,
            field,
            path,
            expected: "string",
        })
}

fn number_at(
    entry: &Value,
    index: usize,
    field: &'static str,
    pointer: &str,
    path: &'static str,
) -> Result<f64, RecordError> {
    entry
        .pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or(RecordError {
            index,
            field,
            path,
            expected: "number",
        })
}
