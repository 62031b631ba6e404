//! Wire timestamp format.
//!
//! Every instant crossing the wire is an ISO 8601 UTC string with
//! millisecond precision, e.g. `2025-01-01T00:00:02.000Z`. Parsing also
//! accepts any RFC 3339 form so clients with higher-precision clocks
//! still sync.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// The canonical wire format: UTC, millisecond precision, literal `Z`.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats an instant in the canonical wire form.
pub fn format(instant: DateTime<Utc>) -> String {
    instant.format(WIRE_FORMAT).to_string()
}

/// Parses a wire timestamp.
///
/// Tries the canonical millisecond form first, then falls back to
/// RFC 3339. Returns `None` if neither parses.
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, WIRE_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
