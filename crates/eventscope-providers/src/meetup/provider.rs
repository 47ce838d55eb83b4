//! Meetup provider: cache-first related-event lookups.

use std::sync::Arc;

use tracing::debug;

use eventscope_core::{CustomerEvent, ExternalEvent, time};

use crate::credentials::CredentialStore;
use crate::error::{ProviderError, ProviderResult};
use crate::event_cache::EventCache;
use crate::oauth::{AuthStatus, TokenManager};
use crate::provider::{BoxFuture, EventProvider};

use super::SERVICE;
use super::client::{MeetupClient, SearchQuery};
use super::config::MeetupConfig;

/// Meetup event provider.
///
/// Holds no token or result state of its own; tokens live in the
/// [`CredentialStore`] behind the [`TokenManager`], results in the
/// [`EventCache`], so lookups survive process restarts.
pub struct MeetupProvider {
    config: MeetupConfig,
    tokens: Arc<TokenManager>,
    cache: EventCache,
}

impl MeetupProvider {
    /// Creates a provider, validating the OAuth configuration up front.
    pub fn new(
        config: MeetupConfig,
        store: CredentialStore,
        cache: EventCache,
    ) -> ProviderResult<Self> {
        let tokens = Arc::new(TokenManager::new(SERVICE, config.oauth_config(), store)?);
        Ok(Self {
            config,
            tokens,
            cache,
        })
    }

    /// The token lifecycle manager for this provider's service.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Finds events related to a customer event.
    ///
    /// Consults the correlation cache first; on a miss, acquires a valid
    /// access token (possibly refreshing), runs the upstream search,
    /// persists the normalized result under the event's identity key and
    /// returns it. Auth errors propagate before any search call is made.
    pub async fn find_related_events(
        &self,
        event: &CustomerEvent,
    ) -> ProviderResult<Vec<ExternalEvent>> {
        let key = event.key();

        let cached = self.cache.get(key);
        if !cached.is_empty() {
            debug!(key, count = cached.len(), "returning cached related events");
            return Ok(cached);
        }

        let access_token = self.tokens.ensure_valid_access_token().await?;
        let query = self.build_query(event)?;

        let client = MeetupClient::new(access_token, &self.config.api_base_url, self.config.timeout)?;
        let events = client.search_upcoming(&query).await?;

        self.cache.put(key, &events)?;
        Ok(events)
    }

    /// Fetches a single event by id via GraphQL.
    pub async fn fetch_event(&self, event_id: &str) -> ProviderResult<ExternalEvent> {
        let access_token = self.tokens.ensure_valid_access_token().await?;
        let client = MeetupClient::new(access_token, &self.config.api_base_url, self.config.timeout)?;
        client.fetch_event(event_id).await
    }

    fn build_query(&self, event: &CustomerEvent) -> ProviderResult<SearchQuery> {
        if event.location().is_empty() {
            return Err(
                ProviderError::bad_request("customer event must have a location")
                    .with_service(SERVICE),
            );
        }

        Ok(SearchQuery {
            location: event.location().to_string(),
            radius_km: self.config.radius_km,
            page_size: self.config.page_size,
            category: (!event.category().is_empty()).then(|| event.category().to_string()),
            start_date_range: event.start().map(time::format_utc),
        })
    }
}

impl EventProvider for MeetupProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    fn find_related<'a>(
        &'a self,
        event: &'a CustomerEvent,
    ) -> BoxFuture<'a, ProviderResult<Vec<ExternalEvent>>> {
        Box::pin(self.find_related_events(event))
    }

    fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    fn status(&self) -> AuthStatus {
        self.tokens.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn provider(dir: &TempDir) -> MeetupProvider {
        let config = MeetupConfig::new("id", "secret", "http://localhost:3000/oauth/callback");
        let store = CredentialStore::new(dir.path().join("tokens"));
        let cache = EventCache::new(dir.path().join("events"));
        MeetupProvider::new(config, store, cache).unwrap()
    }

    #[test]
    fn query_requires_location() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let event = CustomerEvent::new("", "music");
        assert!(provider.build_query(&event).is_err());
    }

    #[test]
    fn query_carries_filters() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let event = CustomerEvent::new("Ostrava, Czech Republic", "music").with_start(start);

        let query = provider.build_query(&event).unwrap();
        assert_eq!(query.location, "Ostrava, Czech Republic");
        assert_eq!(query.category.as_deref(), Some("music"));
        assert_eq!(query.start_date_range.as_deref(), Some("2025-07-01T00:00:00Z"));
        assert_eq!(query.radius_km, 50);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn query_omits_empty_category() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let event = CustomerEvent::new("Ostrava", "");
        let query = provider.build_query(&event).unwrap();
        assert!(query.category.is_none());
        assert!(query.start_date_range.is_none());
    }
}
