//! Event provider implementations and credential lifecycle management.
//!
//! This crate hosts the [`EventProvider`] trait and its Meetup and
//! Eventbrite implementations, plus the machinery they share: OAuth2
//! token acquisition and refresh ([`TokenManager`]), token persistence
//! ([`CredentialStore`]) and the append-only correlation cache
//! ([`EventCache`]).

pub mod credentials;
pub mod error;
pub mod event_cache;
pub mod eventbrite;
pub mod meetup;
pub mod oauth;
pub mod provider;

pub use credentials::{CredentialStore, TokenRecord};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use event_cache::EventCache;
pub use eventbrite::{EventbriteClient, EventbriteConfig, EventbriteProvider, EventbriteQuery};
pub use meetup::{MeetupClient, MeetupConfig, MeetupProvider, SearchQuery};
pub use oauth::{AuthStatus, OAuthConfig, REFRESH_MARGIN_SECS, TokenManager};
pub use provider::{BoxFuture, EventProvider};
