//! Line-oriented record output.

use std::io::{self, Write};

use crate::locations::LocationRecord;

/// Separator between fields of a text line.
pub const FIELD_SEPARATOR: &str = " , ";

/// How records are written to the output stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `timestamp , id , lat , long , name , photoURL`
    #[default]
    Text,
    /// One JSON object per line.
    JsonLines,
}

/// Renders a record as a text line (without the newline).
#[must_use]
pub fn format_record(record: &LocationRecord) -> String {
    [
        record.captured_at.to_string(),
        record.id.clone(),
        record.latitude.to_string(),
        record.longitude.to_string(),
        record.name.clone(),
        record.photo_url.clone(),
    ]
    .join(FIELD_SEPARATOR)
}

/// Writes every record as one line and flushes.
///
/// # Errors
///
/// Returns the underlying I/O or serialization error.
pub fn write_records<W: Write>(
    out: &mut W,
    records: &[LocationRecord],
    format: OutputFormat,
) -> io::Result<()> {
    for record in records {
        match format {
            OutputFormat::Text => writeln!(out, "{}", format_record(record))?,
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()
}
