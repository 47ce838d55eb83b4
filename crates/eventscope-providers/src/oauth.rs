//! OAuth2 token lifecycle management.
//!
//! The [`TokenManager`] drives a three-state machine per service:
//! Unauthorized (no usable stored record), Authorized-Valid (expiry more
//! than the safety margin away), and Authorized-Expiring (within the margin
//! or past it, detected lazily when the access token is read).
//!
//! Code exchange moves Unauthorized to Authorized-Valid; a refresh exchange
//! moves Authorized-Expiring back to Authorized-Valid; revoking returns to
//! Unauthorized. Exchange and refresh results are always written back to
//! the [`CredentialStore`] so tokens survive process restarts.
//!
//! Exchange failures are never retried: authorization codes are single-use
//! and refresh tokens may rotate on first use.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credentials::{CredentialStore, TokenRecord};
use crate::error::{ProviderError, ProviderResult};

/// Safety margin before expiry at which a token counts as expiring.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// OAuth2 client configuration for one service.
///
/// The redirect URI must be byte-for-byte identical to the one registered
/// upstream; providers match redirect URIs by exact string.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// The registered OAuth2 client id.
    pub client_id: String,
    /// The registered OAuth2 client secret.
    pub client_secret: String,
    /// The exact registered redirect URI.
    pub redirect_uri: String,
    /// The provider-hosted authorization endpoint.
    pub auth_url: String,
    /// The provider-hosted token endpoint.
    pub token_url: String,
    /// Bound applied to every outbound token request.
    pub timeout: Duration,
}

impl OAuthConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with the default timeout.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration. Missing client id, client secret, or
    /// redirect URI fails here, at construction time, not at first use.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.trim().is_empty() {
            return Err("client_secret is required");
        }
        if self.redirect_uri.trim().is_empty() {
            return Err("redirect_uri is required");
        }
        if self.auth_url.trim().is_empty() || self.token_url.trim().is_empty() {
            return Err("authorization and token endpoints are required");
        }
        Ok(())
    }
}

/// Authentication status for one service, as exposed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AuthStatus {
    /// Whether a stored token record exists.
    pub authenticated: bool,
    /// Seconds until the access token expires, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// The stored token type, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl AuthStatus {
    /// The status for a service with no stored record.
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            expires_in: None,
            token_type: None,
        }
    }
}

/// Response from a provider's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// OAuth2 token lifecycle manager for one service.
///
/// Holds no token state of its own; every operation reads from and writes
/// back to the [`CredentialStore`], so concurrent processes sharing the
/// store observe each other's refreshes.
#[derive(Debug)]
pub struct TokenManager {
    service: String,
    config: OAuthConfig,
    store: CredentialStore,
    http_client: reqwest::Client,
    /// Serializes refresh exchanges for this service. Two callers both
    /// observing an expiring token must not race two refresh requests with
    /// the same refresh token: the upstream may invalidate it on first
    /// use, and the loser's overwrite would destroy the only valid grant.
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    /// Creates a manager for a service, validating the configuration.
    pub fn new(
        service: impl Into<String>,
        config: OAuthConfig,
        store: CredentialStore,
    ) -> ProviderResult<Self> {
        let service = service.into();
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_service(&service))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {e}"))
                    .with_service(&service)
            })?;

        Ok(Self {
            service,
            config,
            store,
            http_client,
            refresh_lock: Mutex::new(()),
        })
    }

    /// The service this manager is bound to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Builds the authorization URL the user is redirected to.
    ///
    /// Pure function of the configured client id and redirect URI; both
    /// are percent-encoded as query parameter values.
    pub fn build_authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
        )
    }

    /// Exchanges an authorization code for tokens and persists the result.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<TokenRecord> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];

        let record = self.request_token(&params, "token exchange").await?;
        self.store.save(&self.service, &record)?;
        info!(service = %self.service, "obtained tokens from authorization code");
        Ok(record)
    }

    /// Returns a currently valid access token, refreshing first when the
    /// stored token is within [`REFRESH_MARGIN_SECS`] of expiry.
    ///
    /// # Errors
    ///
    /// `ReauthorizationRequired` when no usable record exists or the
    /// record is expiring without a refresh token; `AuthExchangeFailed`
    /// when the refresh exchange is rejected upstream.
    pub async fn ensure_valid_access_token(&self) -> ProviderResult<String> {
        // Fast path: token comfortably within its lifetime.
        if let Some(record) = self.store.get(&self.service)
            && !record.access_token.is_empty()
            && !record.is_expiring(REFRESH_MARGIN_SECS)
        {
            return Ok(record.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Re-check under the lock: a concurrent caller may have refreshed
        // while we waited.
        let record = self.store.get(&self.service).ok_or_else(|| {
            ProviderError::reauthorization_required("not authenticated, please authorize first")
                .with_service(&self.service)
        })?;
        if record.access_token.is_empty() {
            return Err(ProviderError::reauthorization_required(
                "stored record has no access token, please authorize again",
            )
            .with_service(&self.service));
        }
        if !record.is_expiring(REFRESH_MARGIN_SECS) {
            return Ok(record.access_token);
        }

        let refresh_token = record.refresh_token.clone().ok_or_else(|| {
            ProviderError::reauthorization_required(
                "access token expired and no refresh token is available",
            )
            .with_service(&self.service)
        })?;

        debug!(service = %self.service, "access token expiring, refreshing");

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let refreshed = self.request_token(&params, "token refresh").await?;

        // Retain the previous refresh token when the upstream issues none.
        let merged = TokenRecord {
            refresh_token: refreshed.refresh_token.clone().or(Some(refresh_token)),
            ..refreshed
        };
        self.store.save(&self.service, &merged)?;

        info!(service = %self.service, "refreshed access token");
        Ok(merged.access_token)
    }

    /// Deletes the stored record; returns whether one existed.
    pub fn revoke(&self) -> bool {
        self.store.delete(&self.service)
    }

    /// Returns true if a stored record with an access token exists.
    pub fn is_authenticated(&self) -> bool {
        self.store
            .get(&self.service)
            .is_some_and(|record| !record.access_token.is_empty())
    }

    /// Returns the authentication status for the HTTP layer.
    pub fn status(&self) -> AuthStatus {
        match self.store.get(&self.service) {
            Some(record) => AuthStatus {
                authenticated: !record.access_token.is_empty(),
                expires_in: record.expires_in(),
                token_type: record.token_type,
            },
            None => AuthStatus::unauthenticated(),
        }
    }

    /// Submits a form-encoded request to the token endpoint and parses
    /// the token payload. Does not persist; callers decide what to save.
    async fn request_token(
        &self,
        params: &[(&str, &str)],
        context: &str,
    ) -> ProviderResult<TokenRecord> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{context} request failed: {e}"))
                    .with_service(&self.service)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read {context} response: {e}"))
                .with_service(&self.service)
        })?;

        if !status.is_success() {
            return Err(ProviderError::auth_exchange(format!(
                "{context} failed ({status}): {body}"
            ))
            .with_service(&self.service));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid {context} response: {e}"))
                .with_service(&self.service)
        })?;

        Ok(TokenRecord::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
            token_response.token_type,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> OAuthConfig {
        OAuthConfig::new(
            "client-id",
            "client-secret",
            "http://localhost:3000/oauth/callback",
            "https://secure.example.com/oauth2/authorize",
            "https://secure.example.com/oauth2/access",
        )
    }

    #[test]
    fn config_validation() {
        assert!(config().validate().is_ok());

        let mut missing_id = config();
        missing_id.client_id = String::new();
        assert!(missing_id.validate().is_err());

        let mut missing_secret = config();
        missing_secret.client_secret = "  ".to_string();
        assert!(missing_secret.validate().is_err());

        let mut missing_redirect = config();
        missing_redirect.redirect_uri = String::new();
        assert!(missing_redirect.validate().is_err());
    }

    #[test]
    fn manager_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        let mut bad = config();
        bad.client_secret = String::new();
        let err = TokenManager::new("meetup", bad, store).unwrap_err();
        assert_eq!(err.code(), crate::error::ProviderErrorCode::Configuration);
    }

    #[test]
    fn authorization_url_format() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        let manager = TokenManager::new("meetup", config(), store).unwrap();

        let url = manager.build_authorization_url();
        assert_eq!(
            url,
            "https://secure.example.com/oauth2/authorize\
             ?client_id=client-id&response_type=code\
             &redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth%2Fcallback"
        );
    }

    #[test]
    fn status_without_record() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        let manager = TokenManager::new("meetup", config(), store).unwrap();

        assert!(!manager.is_authenticated());
        assert_eq!(manager.status(), AuthStatus::unauthenticated());
    }

    #[test]
    fn status_with_record() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        store
            .save(
                "meetup",
                &TokenRecord::new("access", None, Some(3600), Some("bearer".to_string())),
            )
            .unwrap();

        let manager = TokenManager::new("meetup", config(), store).unwrap();
        let status = manager.status();
        assert!(status.authenticated);
        assert_eq!(status.token_type, Some("bearer".to_string()));
        assert!(status.expires_in.unwrap() > 3500);
    }

    #[test]
    fn revoke_deletes_record() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        store
            .save("meetup", &TokenRecord::new("access", None, None, None))
            .unwrap();

        let manager = TokenManager::new("meetup", config(), store).unwrap();
        assert!(manager.revoke());
        assert!(!manager.revoke());
        assert!(!manager.is_authenticated());
    }
}
