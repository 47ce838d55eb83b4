//! Service facade for credential lifecycle and related-event lookups.
//!
//! Wires the configured event providers, their OAuth2 token managers and
//! the durable stores together behind [`EventScope`], the single entry
//! point the HTTP layer dispatches to.

pub mod cli;
pub mod config;
pub mod handler;

pub use config::{OAuthSettings, ServiceConfig};
pub use handler::{CallbackParams, EventScope};
