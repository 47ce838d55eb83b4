//! Meetup provider implementation.
//!
//! Meetup exposes two read paths used here:
//!
//! - REST keyword/location search (`find/upcoming_events`) returning a
//!   list of event objects, used by the related-events pipeline;
//! - a GraphQL by-id fetch (`gql`) returning a single event with nested
//!   venue/group fields.
//!
//! Both require an OAuth2 bearer token obtained through the
//! authorization-code flow and refreshed transparently by the
//! [`TokenManager`](crate::oauth::TokenManager).

mod client;
mod config;
mod provider;

pub use client::{MeetupClient, SearchQuery};
pub use config::MeetupConfig;
pub use provider::MeetupProvider;

/// The service name Meetup records are stored under.
pub const SERVICE: &str = "meetup";
