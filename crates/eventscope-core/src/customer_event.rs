//! Customer event value type and identity-key derivation.
//!
//! A [`CustomerEvent`] is the caller's description of a planned event:
//! a location, a category, an optional date range and an optional free-text
//! query. Location and category are normalized at construction so that
//! equivalent raw inputs (differing only in whitespace or case) produce the
//! same value, and the derived identity key is the join point between the
//! event correlation cache and external lookups.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Normalizes a free-text location string.
///
/// Trims the input, collapses internal whitespace, and title-cases each
/// comma-separated part: `"ostrava,czech republic"` becomes
/// `"Ostrava, Czech Republic"`.
pub fn normalize_location(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        return String::new();
    }
    collapsed
        .split(',')
        .map(|part| title_case(part.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Normalizes a category string: lower-cased and trimmed.
pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Derives the deterministic identity key for a location/category pair
/// (plus an optional query term).
///
/// The key is lower-cased, non-alphanumeric runs are collapsed to a single
/// `_`, and leading/trailing separators are stripped. The derivation is
/// idempotent: feeding a normalized value back in yields the same key.
pub fn identity_key(location: &str, category: &str, query: Option<&str>) -> String {
    let mut base = format!("{location}_{category}");
    if let Some(query) = query {
        base.push('_');
        base.push_str(query);
    }
    NON_ALNUM_RUN
        .replace_all(&base.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

fn title_case(part: &str) -> String {
    part.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw, caller-supplied customer event fields, before normalization.
///
/// This is the deserialization shape; constructing a [`CustomerEvent`]
/// from it normalizes every field and derives the identity key.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerEventInput {
    /// Free-text location (city, country, ...).
    pub location: String,
    /// Category/topic of the planned event.
    pub category: String,
    /// Planned start, if known.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Planned end, if known.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Optional free-text search term.
    #[serde(default)]
    pub query: Option<String>,
    /// Optional external taxonomy label.
    #[serde(default)]
    pub taxonomy_label: Option<String>,
}

/// A customer's planned event, used as a correlation key and search filter.
///
/// Fields are normalized at construction and the identity key is kept in
/// sync with them, so two events built from equivalent raw input always
/// share a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CustomerEventInput")]
pub struct CustomerEvent {
    location: String,
    category: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    query: Option<String>,
    taxonomy_label: Option<String>,
    key: String,
}

impl CustomerEvent {
    /// Creates a customer event from raw location and category strings.
    pub fn new(location: impl AsRef<str>, category: impl AsRef<str>) -> Self {
        let location = normalize_location(location.as_ref());
        let category = normalize_category(category.as_ref());
        let key = identity_key(&location, &category, None);
        Self {
            location,
            category,
            start: None,
            end: None,
            query: None,
            taxonomy_label: None,
            key,
        }
    }

    /// Builder method to set the planned start (normalized to UTC).
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Builder method to set the planned end (normalized to UTC).
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to set the free-text query term.
    ///
    /// The query participates in the identity key, so the key is re-derived.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self.key = identity_key(&self.location, &self.category, self.query.as_deref());
        self
    }

    /// Builder method to set the external taxonomy label.
    pub fn with_taxonomy_label(mut self, label: impl Into<String>) -> Self {
        self.taxonomy_label = Some(label.into());
        self
    }

    /// The normalized location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The normalized category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The planned start, if known.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// The planned end, if known.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// The free-text query term, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The external taxonomy label, if any.
    pub fn taxonomy_label(&self) -> Option<&str> {
        self.taxonomy_label.as_deref()
    }

    /// The derived identity key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl From<CustomerEventInput> for CustomerEvent {
    fn from(input: CustomerEventInput) -> Self {
        let mut event = CustomerEvent::new(&input.location, &input.category);
        if let Some(start) = input.start {
            event = event.with_start(start);
        }
        if let Some(end) = input.end {
            event = event.with_end(end);
        }
        if let Some(query) = input.query {
            event = event.with_query(query);
        }
        if let Some(label) = input.taxonomy_label {
            event = event.with_taxonomy_label(label);
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_normalization() {
        assert_eq!(
            normalize_location("ostrava,czech republic"),
            "Ostrava, Czech Republic"
        );
        assert_eq!(
            normalize_location("  Ostrava,   Czech Republic "),
            "Ostrava, Czech Republic"
        );
        assert_eq!(normalize_location(""), "");
    }

    #[test]
    fn category_normalization() {
        assert_eq!(normalize_category("  Music "), "music");
        assert_eq!(normalize_category("TECH"), "tech");
    }

    #[test]
    fn key_derivation() {
        let event = CustomerEvent::new("Ostrava, Czech Republic", "music");
        assert_eq!(event.key(), "ostrava_czech_republic_music");
    }

    #[test]
    fn key_is_stable_for_equivalent_input() {
        let a = CustomerEvent::new("Ostrava, Czech Republic", "music");
        let b = CustomerEvent::new("ostrava,czech republic", "MUSIC");
        let c = CustomerEvent::new("  Ostrava,   Czech Republic ", " music ");
        assert_eq!(a.key(), b.key());
        assert_eq!(b.key(), c.key());
    }

    #[test]
    fn key_derivation_is_idempotent() {
        let first = identity_key("Ostrava, Czech Republic", "music", None);
        let again = identity_key(&first, "", None);
        // Re-deriving from the key plus an empty category only appends a
        // separator, which is stripped again.
        assert_eq!(first, again);
    }

    #[test]
    fn query_participates_in_key() {
        let plain = CustomerEvent::new("Ostrava", "music");
        let queried = CustomerEvent::new("Ostrava", "music").with_query("open air");
        assert_eq!(plain.key(), "ostrava_music");
        assert_eq!(queried.key(), "ostrava_music_open_air");
    }

    #[test]
    fn key_strips_edge_separators() {
        let event = CustomerEvent::new("  !!Ostrava!! ", "music!");
        assert_eq!(event.key(), "ostrava_music");
    }

    #[test]
    fn deserialization_normalizes() {
        let event: CustomerEvent = serde_json::from_str(
            r#"{"location": "ostrava,czech republic", "category": "Music"}"#,
        )
        .unwrap();
        assert_eq!(event.location(), "Ostrava, Czech Republic");
        assert_eq!(event.category(), "music");
        assert_eq!(event.key(), "ostrava_czech_republic_music");
    }
}
