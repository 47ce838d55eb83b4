//! Append-only correlation cache for related-event result sets.
//!
//! Each successful fetch is persisted as its own uniquely named JSON file,
//! `{key}_{YYYYMMDD_HHMMSS}{nanos}.json`, so history is never overwritten
//! and a crash can only ever corrupt the newest record. Reads select the
//! record whose persisted `timestamp` field is greatest; the filename
//! suffix only identifies a key's records and keeps names unique. No
//! merging across fetches: the newest record wins outright.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use eventscope_core::ExternalEvent;

use crate::error::{ProviderError, ProviderResult};

/// Wire shape of one cached fetch.
#[derive(Debug, Serialize, Deserialize)]
struct CachedResult {
    customer_event_id: String,
    timestamp: DateTime<Utc>,
    related_events: Vec<ExternalEvent>,
}

/// Durable storage of related-event result sets keyed by customer-event
/// identity key.
#[derive(Debug, Clone)]
pub struct EventCache {
    dir: PathBuf,
}

impl EventCache {
    /// Creates a cache rooted at the given directory. The directory is
    /// created on first put.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists a result set for a key as a new record, never overwriting
    /// prior records. Returns the written path.
    pub fn put(&self, key: &str, events: &[ExternalEvent]) -> ProviderResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ProviderError::storage(format!("failed to create events directory: {e}"))
        })?;

        let now = Utc::now();
        let filename = format!(
            "{key}_{}{:09}.json",
            now.format("%Y%m%d_%H%M%S"),
            now.timestamp_subsec_nanos(),
        );
        let path = self.dir.join(filename);

        let payload = CachedResult {
            customer_event_id: key.to_string(),
            timestamp: now,
            related_events: events.to_vec(),
        };
        let content = serde_json::to_string_pretty(&payload)
            .map_err(|e| ProviderError::internal(format!("failed to serialize events: {e}")))?;
        fs::write(&path, content)
            .map_err(|e| ProviderError::storage(format!("failed to write events file: {e}")))?;

        debug!(key, count = events.len(), path = %path.display(), "cached related events");
        Ok(path)
    }

    /// Returns the most recently stored result set for a key, or an empty
    /// sequence when none exists or every record is unreadable (a cache
    /// miss, never an error).
    ///
    /// Recency comes from the record's own `timestamp` field rather than
    /// filename ordering; ties fall back to the name, whose suffix is
    /// itself timestamp-shaped.
    pub fn get(&self, key: &str) -> Vec<ExternalEvent> {
        let mut latest: Option<(DateTime<Utc>, String, CachedResult)> = None;

        for path in self.record_paths(key) {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(key, path = %path.display(), error = %e, "failed to read cached events");
                    continue;
                }
            };
            let cached = match serde_json::from_str::<CachedResult>(&content) {
                Ok(cached) => cached,
                Err(e) => {
                    warn!(key, path = %path.display(), error = %e, "unparsable cached events");
                    continue;
                }
            };

            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let candidate = (cached.timestamp, name.to_string());
            if latest
                .as_ref()
                .is_none_or(|(ts, name, _)| candidate > (*ts, name.clone()))
            {
                latest = Some((candidate.0, candidate.1, cached));
            }
        }

        match latest {
            Some((_, _, cached)) => {
                debug!(key, count = cached.related_events.len(), "cache hit");
                cached.related_events
            }
            None => Vec::new(),
        }
    }

    /// Lists the record paths belonging to a key.
    fn record_paths(&self, key: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let prefix = format!("{key}_");

        let mut paths = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };
            // An exact timestamp-suffix check keeps a key that prefixes
            // another key from matching the longer key's records.
            if !is_timestamp_suffix(rest) {
                continue;
            }
            paths.push(self.dir.join(name));
        }
        paths
    }
}

/// Checks a record-name remainder against the `YYYYMMDD_HHMMSS` plus
/// nine-digit nanosecond shape produced by [`EventCache::put`].
fn is_timestamp_suffix(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() == 24
        && bytes[8] == b'_'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit())
}
