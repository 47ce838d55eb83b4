//! EventProvider trait definition.
//!
//! The core abstraction for external event platforms (Meetup, Eventbrite).
//! Providers own the full lookup pipeline: identity-key cache consultation,
//! access-token acquisition, the provider-specific search request, and
//! normalization into [`ExternalEvent`].

use std::future::Future;
use std::pin::Pin;

use eventscope_core::{CustomerEvent, ExternalEvent};

use crate::error::ProviderResult;
use crate::oauth::AuthStatus;

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so the service facade can hold
/// heterogeneous providers behind `dyn EventProvider`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An external event platform.
///
/// # Implementation notes
///
/// - `find_related` must consult the correlation cache before any network
///   call and must populate it after a successful fetch, so repeated
///   lookups for the same customer event are idempotent.
/// - Auth failures (`ReauthorizationRequired`, `AuthExchangeFailed`)
///   propagate; search failures degrade to an empty result set.
pub trait EventProvider: Send + Sync {
    /// Returns the service name of this provider (e.g., "meetup").
    fn name(&self) -> &str;

    /// Finds externally-listed events related to a customer event.
    fn find_related<'a>(
        &'a self,
        event: &'a CustomerEvent,
    ) -> BoxFuture<'a, ProviderResult<Vec<ExternalEvent>>>;

    /// Checks if the provider currently holds a stored token record.
    fn is_authenticated(&self) -> bool;

    /// Returns the authentication status for the HTTP layer.
    fn status(&self) -> AuthStatus;
}
