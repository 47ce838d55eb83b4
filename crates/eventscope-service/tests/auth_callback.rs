//! Facade-level callback flow against a mock token endpoint.

use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eventscope_providers::{
    CredentialStore, EventCache, MeetupConfig, MeetupProvider, ProviderErrorCode,
};
use eventscope_service::{CallbackParams, EventScope, ServiceConfig};

fn facade_against(server: &MockServer, dir: &TempDir) -> EventScope {
    let provider_config = MeetupConfig::new("client-id", "client-secret", "http://localhost:3000/oauth/callback")
        .with_token_url(format!("{}/oauth2/access", server.uri()))
        .with_api_base_url(server.uri());
    let provider = MeetupProvider::new(
        provider_config,
        CredentialStore::new(dir.path().join("tokens")),
        EventCache::new(dir.path().join("events")),
    )
    .unwrap();
    let tokens = Arc::clone(provider.token_manager());

    let mut facade = EventScope::new(&ServiceConfig::new(dir.path())).unwrap();
    facade.register(tokens, Box::new(provider));
    facade
}

#[tokio::test]
async fn successful_callback_exchanges_and_persists() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/access"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "token_type": "bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let facade = facade_against(&server, &dir);
    let params = CallbackParams {
        code: Some("auth-code-1".to_string()),
        ..Default::default()
    };
    let record = facade.handle_callback("meetup", params).await.unwrap();
    assert_eq!(record.access_token, "access-1");

    let status = facade.auth_status("meetup").unwrap();
    assert!(status.authenticated);
}

#[tokio::test]
async fn denied_callback_never_reaches_the_token_endpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/access"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let facade = facade_against(&server, &dir);
    let params = CallbackParams {
        code: None,
        error: Some("access_denied".to_string()),
        error_description: None,
    };
    let err = facade.handle_callback("meetup", params).await.unwrap_err();
    assert_eq!(err.code(), ProviderErrorCode::AuthExchangeFailed);
    assert!(err.to_string().contains("access_denied"));
    assert!(!facade.auth_status("meetup").unwrap().authenticated);
}
