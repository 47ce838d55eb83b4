//! Meetup provider configuration.

use std::time::Duration;

use crate::oauth::OAuthConfig;

/// Configuration for the Meetup provider.
///
/// Endpoint URLs are overridable for testing; search defaults (radius,
/// page size) follow Meetup's documented limits.
#[derive(Debug, Clone)]
pub struct MeetupConfig {
    /// The registered OAuth2 client id.
    pub client_id: String,
    /// The registered OAuth2 client secret.
    pub client_secret: String,
    /// The exact registered redirect URI.
    pub redirect_uri: String,
    /// The authorization endpoint.
    pub auth_url: String,
    /// The token endpoint.
    pub token_url: String,
    /// Base URL of the REST and GraphQL APIs.
    pub api_base_url: String,
    /// Search radius around the customer event's location.
    pub radius_km: u32,
    /// Page size for event searches.
    pub page_size: u32,
    /// Request timeout applied to every outbound call.
    pub timeout: Duration,
}

impl MeetupConfig {
    /// Default authorization endpoint.
    pub const DEFAULT_AUTH_URL: &'static str = "https://secure.meetup.com/oauth2/authorize";

    /// Default token endpoint.
    pub const DEFAULT_TOKEN_URL: &'static str = "https://secure.meetup.com/oauth2/access";

    /// Default API base URL.
    pub const DEFAULT_API_BASE_URL: &'static str = "https://api.meetup.com";

    /// Default search radius in kilometers.
    pub const DEFAULT_RADIUS_KM: u32 = 50;

    /// Default search page size.
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with default endpoints and search limits.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: Self::DEFAULT_AUTH_URL.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            radius_km: Self::DEFAULT_RADIUS_KM,
            page_size: Self::DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the authorization endpoint.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Sets the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the search radius in kilometers.
    pub fn with_radius_km(mut self, radius_km: u32) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Sets the search page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the OAuth2 client configuration for this provider.
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig::new(
            &self.client_id,
            &self.client_secret,
            &self.redirect_uri,
            &self.auth_url,
            &self.token_url,
        )
        .with_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MeetupConfig::new("id", "secret", "http://localhost:3000/oauth/callback");
        assert_eq!(config.auth_url, MeetupConfig::DEFAULT_AUTH_URL);
        assert_eq!(config.token_url, MeetupConfig::DEFAULT_TOKEN_URL);
        assert_eq!(config.api_base_url, MeetupConfig::DEFAULT_API_BASE_URL);
        assert_eq!(config.radius_km, 50);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn builders_override_defaults() {
        let config = MeetupConfig::new("id", "secret", "http://localhost:3000/oauth/callback")
            .with_api_base_url("http://127.0.0.1:9999")
            .with_radius_km(25)
            .with_page_size(5);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.radius_km, 25);
        assert_eq!(config.page_size, 5);
    }

    #[test]
    fn oauth_config_carries_credentials() {
        let config = MeetupConfig::new("id", "secret", "http://localhost:3000/oauth/callback");
        let oauth = config.oauth_config();
        assert_eq!(oauth.client_id, "id");
        assert_eq!(oauth.token_url, MeetupConfig::DEFAULT_TOKEN_URL);
        assert!(oauth.validate().is_ok());
    }
}
