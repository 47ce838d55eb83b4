//! Eventbrite provider configuration.

use std::time::Duration;

use crate::oauth::OAuthConfig;

/// Configuration for the Eventbrite provider.
#[derive(Debug, Clone)]
pub struct EventbriteConfig {
    /// The registered OAuth2 client id (API key).
    pub client_id: String,
    /// The registered OAuth2 client secret.
    pub client_secret: String,
    /// The exact registered redirect URI.
    pub redirect_uri: String,
    /// The authorization endpoint.
    pub auth_url: String,
    /// The token endpoint.
    pub token_url: String,
    /// Base URL of the REST API.
    pub api_base_url: String,
    /// Search radius around the customer event's location.
    pub radius_km: u32,
    /// Page size for event searches.
    pub page_size: u32,
    /// Request timeout applied to every outbound call.
    pub timeout: Duration,
}

impl EventbriteConfig {
    /// Default authorization endpoint.
    pub const DEFAULT_AUTH_URL: &'static str = "https://www.eventbrite.com/oauth/authorize";

    /// Default token endpoint.
    pub const DEFAULT_TOKEN_URL: &'static str = "https://www.eventbrite.com/oauth/token";

    /// Default API base URL.
    pub const DEFAULT_API_BASE_URL: &'static str = "https://www.eventbriteapi.com/v3";

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
        let config =
            EventbriteConfig::new("id", "secret", "http://localhost:3000/api/auth/callback");
        assert_eq!(config.auth_url, EventbriteConfig::DEFAULT_AUTH_URL);
        assert_eq!(config.api_base_url, EventbriteConfig::DEFAULT_API_BASE_URL);
        assert_eq!(config.radius_km, 50);
    }

    #[test]
    fn oauth_config_is_valid() {
        let config =
            EventbriteConfig::new("id", "secret", "http://localhost:3000/api/auth/callback");
        assert!(config.oauth_config().validate().is_ok());
    }
}
