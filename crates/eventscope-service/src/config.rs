//! Service configuration.
//!
//! A [`ServiceConfig`] is an explicit value object; [`ServiceConfig::from_env`]
//! is the only place environment variables are read, so the rest of the
//! crate is testable with plain constructors.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// OAuth2 client settings for one external service.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    /// The registered OAuth2 client id.
    pub client_id: String,
    /// The registered OAuth2 client secret.
    pub client_secret: String,
    /// The exact registered redirect URI.
    pub redirect_uri: String,
}

impl OAuthSettings {
    /// Creates settings for one service.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Top-level service configuration.
///
/// Services without settings are simply not registered; asking for them
/// later yields a not-found error rather than a misconfigured provider.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding per-service token files.
    pub credentials_dir: PathBuf,
    /// Directory holding cached related-event records.
    pub events_dir: PathBuf,
    /// Meetup OAuth settings, when configured.
    pub meetup: Option<OAuthSettings>,
    /// Eventbrite OAuth settings, when configured.
    pub eventbrite: Option<OAuthSettings>,
    /// Timeout applied to every outbound call.
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Default redirect URI when none is configured.
    pub const DEFAULT_REDIRECT_URI: &'static str = "http://localhost:3000/oauth/callback";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration rooted at a data directory, with tokens
    /// under `tokens/` and cached events under `events/`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            credentials_dir: data_dir.join("tokens"),
            events_dir: data_dir.join("events"),
            meetup: None,
            eventbrite: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set Meetup OAuth settings.
    pub fn with_meetup(mut self, settings: OAuthSettings) -> Self {
        self.meetup = Some(settings);
        self
    }

    /// Builder: set Eventbrite OAuth settings.
    pub fn with_eventbrite(mut self, settings: OAuthSettings) -> Self {
        self.eventbrite = Some(settings);
        self
    }

    /// Builder: set the outbound request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the configuration from the environment.
    ///
    /// A service is registered only when both its client id and secret
    /// are set; redirect URIs fall back to [`Self::DEFAULT_REDIRECT_URI`].
    pub fn from_env(data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(data_dir);

        if let (Ok(id), Ok(secret)) = (env::var("MEETUP_KEY"), env::var("MEETUP_SECRET")) {
            let redirect = env::var("MEETUP_REDIRECT_URI")
                .unwrap_or_else(|_| Self::DEFAULT_REDIRECT_URI.to_string());
            config.meetup = Some(OAuthSettings::new(id, secret, redirect));
        }

        if let (Ok(id), Ok(secret)) = (
            env::var("EVENTBRITE_API"),
            env::var("EVENTBRITE_CLIENT_SECRET"),
        ) {
            let redirect = env::var("EVENTBRITE_REDIRECT_URI")
                .unwrap_or_else(|_| Self::DEFAULT_REDIRECT_URI.to_string());
            config.eventbrite = Some(OAuthSettings::new(id, secret, redirect));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_derive_from_data_dir() {
        let config = ServiceConfig::new("/var/lib/eventscope");
        assert_eq!(
            config.credentials_dir,
            PathBuf::from("/var/lib/eventscope/tokens")
        );
        assert_eq!(config.events_dir, PathBuf::from("/var/lib/eventscope/events"));
        assert!(config.meetup.is_none());
        assert!(config.eventbrite.is_none());
    }

    #[test]
    fn builders_register_services() {
        let config = ServiceConfig::new("/tmp/data")
            .with_meetup(OAuthSettings::new("id", "secret", "http://localhost/cb"))
            .with_timeout(Duration::from_secs(5));
        assert!(config.meetup.is_some());
        assert!(config.eventbrite.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
