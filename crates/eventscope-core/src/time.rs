//! UTC instant formatting and lenient parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Formats an instant in the wire format the event APIs expect
/// (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parses a provider-reported time string into a UTC instant.
///
/// Accepts RFC 3339 with an offset, a bare `YYYY-MM-DDTHH:MM:SS`
/// (assumed UTC), and the `YYYY-MM-DD HH:MM[:SS]` shape Meetup uses for
/// local date/time pairs. Returns `None` for anything else.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
