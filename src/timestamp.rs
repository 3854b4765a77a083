//! ISO-8601 timestamps in the format browsers emit from `Date.toISOString()`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time with millisecond precision and a `Z` suffix.
#[must_use]
pub fn now_iso8601() -> String {
    format_iso8601(Utc::now())
}

/// Formats `instant` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn format_iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 / RFC 3339 timestamp, normalizing to UTC.
///
/// Returns `None` for anything that is not a valid RFC 3339 string.
#[must_use]
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}
