//! Eventbrite provider implementation.
//!
//! Eventbrite exposes a REST keyword/location search (`events/search/`)
//! whose events carry nested `name.text` / `start.utc` shapes; the client
//! flattens them into the canonical [`ExternalEvent`] record. Tokens come
//! from the same authorization-code flow as Meetup, against Eventbrite's
//! own endpoints.

mod client;
mod config;
mod provider;

pub use client::{EventbriteClient, EventbriteQuery};
pub use config::EventbriteConfig;
pub use provider::EventbriteProvider;

/// The service name Eventbrite records are stored under.
pub const SERVICE: &str = "eventbrite";
