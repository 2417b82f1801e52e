//! End-to-end tests for login, logout and the navigation guard.

use std::sync::Arc;

use netbill_console::{
    AppState, AuthError, Config, MemoryTokenStore, NotificationKind, ResourceKind, Route,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_state(
    server: &MockServer,
    token: Option<&str>,
    profile_path: Option<&str>,
) -> (AppState, Arc<MemoryTokenStore>) {
    let storage = Arc::new(MemoryTokenStore::new(token.map(str::to_string)));
    let config = Config {
        server_url: server.uri(),
        profile_path: profile_path.map(str::to_string),
        ..Config::default()
    };
    let state = AppState::with_token_store(config, storage.clone()).unwrap();
    (state, storage)
}

// ==================== Login Tests ====================

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"username": "admin", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let (state, storage) = create_test_state(&server, None, None);
    state.auth().login("admin", "secret").await.unwrap();

    assert_eq!(storage.stored().as_deref(), Some("abc123"));
    assert_eq!(state.session().token().as_deref(), Some("abc123"));
    assert!(state.auth().is_authenticated());
    assert_eq!(state.navigator().current(), Route::Account);
    assert!(state.notifications().is_empty());
}

#[tokio::test]
async fn test_login_with_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error": "invalid credentials"}"#),
        )
        .mount(&server)
        .await;

    let (state, storage) = create_test_state(&server, None, None);
    let err = state.auth().login("admin", "wrong").await.unwrap_err();

    match &err {
        AuthError::Rejected(api) => {
            assert!(api.is_unauthorized());
            assert_eq!(api.message(), "invalid credentials");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    assert_eq!(storage.stored(), None);
    assert_eq!(state.session().token(), None);

    let queue = state.notifications().snapshot();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_failed_login_clears_previous_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (state, storage) = create_test_state(&server, Some("old-token"), None);
    assert!(state.auth().login("admin", "wrong").await.is_err());

    assert_eq!(storage.stored(), None);
    assert!(!state.session().is_authenticated());
}

#[tokio::test]
async fn test_login_response_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let (state, storage) = create_test_state(&server, None, None);
    let err = state.auth().login("admin", "secret").await.unwrap_err();

    assert!(matches!(err, AuthError::MissingToken));
    assert!(err.api_error().is_none());
    assert_eq!(storage.stored(), None);
    assert_ne!(state.navigator().current(), Route::Account);
}

#[tokio::test]
async fn test_token_is_sent_after_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tariffs"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, None, None);
    state.auth().login("admin", "secret").await.unwrap();

    let tariffs = state.records(ResourceKind::Tariffs);
    tariffs.fetch_items().await;

    assert_eq!(tariffs.items().len(), 1);
}

// ==================== Logout Tests ====================

#[tokio::test]
async fn test_logout_clears_session_and_redirects() {
    let server = MockServer::start().await;
    let (state, storage) = create_test_state(&server, Some("abc123"), None);
    state.session().set_user(Some(json!({"login": "admin"})));

    state.auth().logout();

    assert_eq!(storage.stored(), None);
    assert_eq!(state.session().token(), None);
    assert_eq!(state.session().user(), None);
    assert_eq!(state.navigator().current(), Route::Login);
}

// ==================== Profile Tests ====================

#[tokio::test]
async fn test_fetch_user_is_noop_without_endpoint() {
    let server = MockServer::start().await;
    let (state, _) = create_test_state(&server, Some("abc123"), None);

    state.auth().fetch_user().await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(state.session().user().is_none());
}

#[tokio::test]
async fn test_fetch_user_stores_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": "admin"})),
        )
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("abc123"), Some("/users/me"));
    state.auth().fetch_user().await.unwrap();

    assert_eq!(state.session().user().unwrap()["username"], "admin");
}

#[tokio::test]
async fn test_fetch_user_logs_out_on_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
        .mount(&server)
        .await;

    let (state, storage) = create_test_state(&server, Some("expired"), Some("/users/me"));
    let err = state.auth().fetch_user().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(storage.stored(), None);
    assert_eq!(state.navigator().current(), Route::Login);
}

// ==================== Guard Tests ====================

#[tokio::test]
async fn test_guard_follows_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, None, None);
    let nav = state.navigator();

    assert_eq!(nav.navigate("/users"), Route::Login);

    state.auth().login("admin", "secret").await.unwrap();
    assert_eq!(nav.navigate("/login"), Route::Account);
    assert_eq!(nav.navigate("/users"), Route::Resource(ResourceKind::Users));

    state.auth().logout();
    assert_eq!(nav.navigate("/clients"), Route::Login);
}
