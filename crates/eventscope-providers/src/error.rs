//! Error types for provider and credential operations.
//!
//! This module defines the error taxonomy shared by the token lifecycle
//! manager, the persistence stores, and the event providers (Meetup,
//! Eventbrite).

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
///
/// This enum provides a high-level classification of errors for use in
/// HTTP responses and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Required credential/redirect configuration is missing or invalid.
    Configuration,
    /// A code-for-token or refresh-for-token exchange returned a
    /// non-success status. Carries the upstream error body in the message.
    AuthExchangeFailed,
    /// The access token is expired/absent and no refresh token is
    /// available; the caller must restart the authorization flow.
    ReauthorizationRequired,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    Network,
    /// An event search/fetch returned a non-success status.
    UpstreamSearch,
    /// Invalid response from the server - parse error, unexpected format.
    InvalidResponse,
    /// Resource not found - unknown event id or unregistered service.
    NotFound,
    /// Request was invalid - bad parameters, missing callback code.
    BadRequest,
    /// A persisted record could not be written or removed.
    Storage,
    /// Internal error - unexpected state, bug.
    Internal,
}

impl ProviderErrorCode {
    /// Returns true if this error is transient and the operation may be
    /// retried. Token exchanges are never retryable: authorization codes
    /// are single-use and refresh tokens may rotate on first use.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::UpstreamSearch)
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::AuthExchangeFailed => "auth_exchange_failed",
            Self::ReauthorizationRequired => "reauthorization_required",
            Self::Network => "network_error",
            Self::UpstreamSearch => "upstream_search_failure",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Storage => "storage_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from the token lifecycle, the stores, or an event provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    /// The error code categorizing this error.
    code: ProviderErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The service that generated this error (e.g., "meetup").
    service: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            service: None,
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Configuration, message)
    }

    /// Creates an auth-exchange error carrying the upstream body.
    pub fn auth_exchange(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthExchangeFailed, message)
    }

    /// Creates a reauthorization-required error.
    pub fn reauthorization_required(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ReauthorizationRequired, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Network, message)
    }

    /// Creates an upstream-search error.
    pub fn upstream_search(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::UpstreamSearch, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Storage, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Internal, message)
    }

    /// Sets the service name for this error.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the service name, if set.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref service) = self.service {
            write!(f, "[{}] ", service)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_retryable() {
        assert!(ProviderErrorCode::Network.is_retryable());
        assert!(ProviderErrorCode::UpstreamSearch.is_retryable());
        assert!(!ProviderErrorCode::AuthExchangeFailed.is_retryable());
        assert!(!ProviderErrorCode::ReauthorizationRequired.is_retryable());
        assert!(!ProviderErrorCode::Configuration.is_retryable());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(
            ProviderErrorCode::AuthExchangeFailed.as_str(),
            "auth_exchange_failed"
        );
        assert_eq!(
            ProviderErrorCode::ReauthorizationRequired.as_str(),
            "reauthorization_required"
        );
    }

    #[test]
    fn provider_error_creation() {
        let err = ProviderError::reauthorization_required("no refresh token");
        assert_eq!(err.code(), ProviderErrorCode::ReauthorizationRequired);
        assert_eq!(err.message(), "no refresh token");
        assert!(err.service().is_none());
        assert!(!err.is_retryable());
    }

    #[test]
    fn provider_error_with_service() {
        let err = ProviderError::network("connection timeout").with_service("meetup");
        assert_eq!(err.service(), Some("meetup"));
        assert!(err.is_retryable());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::auth_exchange("invalid_grant").with_service("meetup");
        let display = format!("{}", err);
        assert!(display.contains("[meetup]"));
        assert!(display.contains("auth_exchange_failed"));
        assert!(display.contains("invalid_grant"));
    }

    #[test]
    fn provider_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("disk full");
        let err = ProviderError::storage("failed to persist token").with_source(io_err);
        assert!(err.source().is_some());
    }
}
