//! OAuth token records and their durable storage.
//!
//! One JSON file per service, `{service}_token.json`, holding the token
//! payload together with a capture timestamp:
//!
//! ```json
//! { "token_data": { "access_token": "...", "refresh_token": "...",
//!                   "expires_in": 3600, "token_type": "bearer" },
//!   "stored_at": "2025-01-01T00:00:00Z" }
//! ```
//!
//! `expires_in` is relative on the wire; the in-memory [`TokenRecord`]
//! carries the absolute expiry, derived at load time as `now + expires_in`
//! and inverted again at save time. `stored_at` is audit-only and never
//! enters expiry logic.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// One OAuth2 grant for one external service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for minting new access tokens; absent for
    /// services without refresh support.
    pub refresh_token: Option<String>,

    /// When the access token expires, if the service reports a lifetime.
    pub expires_at: Option<DateTime<Utc>>,

    /// The token type, passed through unmodified (typically "bearer").
    pub token_type: Option<String>,
}

impl TokenRecord {
    /// Creates a record from token-endpoint response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        token_type: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
            token_type,
        }
    }

    /// Returns true if the access token expires within `margin_secs`
    /// seconds (or already has). Tokens without a known expiry are
    /// treated as valid.
    pub fn is_expiring(&self, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at - Duration::seconds(margin_secs),
            None => false,
        }
    }

    /// Seconds until expiry; negative when already expired, `None` when
    /// the service reported no lifetime.
    pub fn expires_in(&self) -> Option<i64> {
        self.expires_at.map(|at| (at - Utc::now()).num_seconds())
    }
}

/// Wire shape of the token payload inside the stored file.
#[derive(Debug, Serialize, Deserialize)]
struct WireToken {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
}

/// Wire shape of one persisted credential file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    token_data: WireToken,
    stored_at: DateTime<Utc>,
}

/// Durable key-value persistence of one token record per external service.
///
/// Writes are atomic (temp file + rename) so a reader never observes a
/// half-written record; an unparsable record is treated as absence, never
/// surfaced as an error.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Creates a store rooted at the given directory. The directory is
    /// created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path of the credential file for a service.
    pub fn token_path(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{service}_token.json"))
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists a token record for a service, fully replacing any prior
    /// record.
    pub fn save(&self, service: &str, record: &TokenRecord) -> ProviderResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ProviderError::storage(format!("failed to create credentials directory: {e}"))
        })?;

        let now = Utc::now();
        let stored = StoredRecord {
            token_data: WireToken {
                access_token: record.access_token.clone(),
                refresh_token: record.refresh_token.clone(),
                expires_in: record.expires_at.map(|at| (at - now).num_seconds()),
                token_type: record.token_type.clone(),
            },
            stored_at: now,
        };

        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {e}")))?;

        // Write to a temp file first, then rename for atomicity.
        let path = self.token_path(service);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .map_err(|e| ProviderError::storage(format!("failed to write token file: {e}")))?;
        fs::rename(&temp_path, &path)
            .map_err(|e| ProviderError::storage(format!("failed to rename token file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&path, perms);
        }

        debug!(service, path = %path.display(), "saved token record");
        Ok(())
    }

    /// Returns the most recently saved record for a service, or `None`
    /// when no record exists or the persisted payload is unparsable.
    pub fn get(&self, service: &str) -> Option<TokenRecord> {
        let path = self.token_path(service);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(service, error = %e, "failed to read token file, treating as absent");
                return None;
            }
        };

        let stored: StoredRecord = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(service, error = %e, "unparsable token file, treating as absent");
                return None;
            }
        };

        Some(TokenRecord::new(
            stored.token_data.access_token,
            stored.token_data.refresh_token,
            stored.token_data.expires_in,
            stored.token_data.token_type,
        ))
    }

    /// Removes the record for a service if present. Returns whether a
    /// removal occurred; repeated calls are not an error.
    pub fn delete(&self, service: &str) -> bool {
        let path = self.token_path(service);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(service, "deleted token record");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(service, error = %e, "failed to delete token file");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> TokenRecord {
        TokenRecord::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            Some("bearer".to_string()),
        )
    }

    #[test]
    fn token_record_expiry() {
        let fresh = record();
        assert!(!fresh.is_expiring(60));
        assert!(fresh.expires_in().unwrap() > 3500);

        let mut stale = record();
        stale.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(stale.is_expiring(60));
        assert!(stale.expires_in().unwrap() < 0);

        // Within the margin but not yet past expiry.
        let mut closing = record();
        closing.expires_at = Some(Utc::now() + Duration::seconds(30));
        assert!(closing.is_expiring(60));

        let no_expiry = TokenRecord::new("access", None, None, None);
        assert!(!no_expiry.is_expiring(60));
    }

    #[test]
    fn save_and_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        store.save("meetup", &record()).unwrap();
        let loaded = store.get("meetup").unwrap();

        assert_eq!(loaded.access_token, "access-token");
        assert_eq!(loaded.refresh_token, Some("refresh-token".to_string()));
        assert_eq!(loaded.token_type, Some("bearer".to_string()));
        // expires_at is re-derived at load time; allow clock slack.
        let expires_in = loaded.expires_in().unwrap();
        assert!((3590..=3600).contains(&expires_in));
    }

    #[test]
    fn save_replaces_prior_record() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        store.save("meetup", &record()).unwrap();
        let replacement = TokenRecord::new("new-access", None, Some(100), None);
        store.save("meetup", &replacement).unwrap();

        let loaded = store.get("meetup").unwrap();
        assert_eq!(loaded.access_token, "new-access");
        assert_eq!(loaded.refresh_token, None);
    }

    #[test]
    fn get_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        assert!(store.get("meetup").is_none());
    }

    #[test]
    fn get_unparsable_is_none() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(store.token_path("meetup"), "{not json").unwrap();
        assert!(store.get("meetup").is_none());
    }

    #[test]
    fn delete_semantics() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        assert!(!store.delete("meetup"));
        store.save("meetup", &record()).unwrap();
        assert!(store.delete("meetup"));
        assert!(store.get("meetup").is_none());
        assert!(!store.delete("meetup"));
    }

    #[test]
    fn wire_shape_matches_persisted_layout() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save("meetup", &record()).unwrap();

        let raw = fs::read_to_string(store.token_path("meetup")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("stored_at").is_some());
        let token_data = value.get("token_data").unwrap();
        assert_eq!(token_data["access_token"], "access-token");
        assert_eq!(token_data["token_type"], "bearer");
        assert!(token_data["expires_in"].is_i64());
    }
}
