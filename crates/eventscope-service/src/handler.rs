//! Service facade.
//!
//! [`EventScope`] wires the configured providers, their token managers and
//! the shared stores together and exposes the operations the HTTP layer
//! dispatches to. It holds no request state; every operation is routed by
//! service name.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use eventscope_core::{CustomerEvent, ExternalEvent};
use eventscope_providers::{
    AuthStatus, CredentialStore, EventCache, EventProvider, EventbriteConfig, EventbriteProvider,
    MeetupConfig, MeetupProvider, ProviderError, ProviderResult, TokenManager, TokenRecord,
};

use crate::config::ServiceConfig;

/// Query parameters delivered to the OAuth callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// The single-use authorization code, on success.
    #[serde(default)]
    pub code: Option<String>,
    /// The upstream error identifier, on denial or failure.
    #[serde(default)]
    pub error: Option<String>,
    /// Optional human-readable error description.
    #[serde(default)]
    pub error_description: Option<String>,
}

/// One registered service: its token manager plus its event provider.
struct Handle {
    tokens: Arc<TokenManager>,
    provider: Box<dyn EventProvider>,
}

/// The service facade.
pub struct EventScope {
    services: BTreeMap<String, Handle>,
}

impl EventScope {
    /// Builds the facade from configuration, registering a provider for
    /// every service with OAuth settings. Invalid settings fail here.
    pub fn new(config: &ServiceConfig) -> ProviderResult<Self> {
        let mut facade = Self {
            services: BTreeMap::new(),
        };

        if let Some(ref settings) = config.meetup {
            let provider_config = MeetupConfig::new(
                &settings.client_id,
                &settings.client_secret,
                &settings.redirect_uri,
            )
            .with_timeout(config.timeout);
            let provider = MeetupProvider::new(
                provider_config,
                CredentialStore::new(&config.credentials_dir),
                EventCache::new(&config.events_dir),
            )?;
            let tokens = Arc::clone(provider.token_manager());
            facade.register(tokens, Box::new(provider));
        }

        if let Some(ref settings) = config.eventbrite {
            let provider_config = EventbriteConfig::new(
                &settings.client_id,
                &settings.client_secret,
                &settings.redirect_uri,
            )
            .with_timeout(config.timeout);
            let provider = EventbriteProvider::new(
                provider_config,
                CredentialStore::new(&config.credentials_dir),
                EventCache::new(&config.events_dir),
            )?;
            let tokens = Arc::clone(provider.token_manager());
            facade.register(tokens, Box::new(provider));
        }

        info!(services = ?facade.service_names(), "service facade initialized");
        Ok(facade)
    }

    /// Registers a provider under its own service name. Later
    /// registrations with the same name replace earlier ones.
    pub fn register(&mut self, tokens: Arc<TokenManager>, provider: Box<dyn EventProvider>) {
        self.services
            .insert(provider.name().to_string(), Handle { tokens, provider });
    }

    /// The registered service names, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    /// Returns the authorization URL the user is redirected to.
    pub fn start_login(&self, service: &str) -> ProviderResult<String> {
        Ok(self.handle(service)?.tokens.build_authorization_url())
    }

    /// Completes the authorization-code flow from callback parameters.
    ///
    /// An upstream `error` parameter fails without any token-exchange
    /// call; the error identifier (and description, when present) is
    /// surfaced verbatim.
    pub async fn handle_callback(
        &self,
        service: &str,
        params: CallbackParams,
    ) -> ProviderResult<TokenRecord> {
        let handle = self.handle(service)?;

        if let Some(error) = params.error {
            let message = match params.error_description {
                Some(description) => format!("authorization failed: {error}: {description}"),
                None => format!("authorization failed: {error}"),
            };
            warn!(service, %message, "callback carried an upstream error");
            return Err(ProviderError::auth_exchange(message).with_service(service));
        }

        let code = params.code.filter(|code| !code.trim().is_empty()).ok_or_else(|| {
            ProviderError::bad_request("callback is missing the authorization code")
                .with_service(service)
        })?;

        handle.tokens.exchange_code(&code).await
    }

    /// Returns the authentication status for a service.
    pub fn auth_status(&self, service: &str) -> ProviderResult<AuthStatus> {
        Ok(self.handle(service)?.provider.status())
    }

    /// Deletes the stored grant; returns whether one existed.
    pub fn logout(&self, service: &str) -> ProviderResult<bool> {
        let revoked = self.handle(service)?.tokens.revoke();
        if revoked {
            info!(service, "revoked stored grant");
        }
        Ok(revoked)
    }

    /// Finds externally-listed events related to a customer event.
    pub async fn find_related_events(
        &self,
        service: &str,
        event: &CustomerEvent,
    ) -> ProviderResult<Vec<ExternalEvent>> {
        self.handle(service)?.provider.find_related(event).await
    }

    fn handle(&self, service: &str) -> ProviderResult<&Handle> {
        self.services
            .get(service)
            .ok_or_else(|| ProviderError::not_found(format!("unknown service: {service}")))
    }
}
