use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use mockall::predicate::eq;
use std::sync::Arc;

use super::*;
use crate::auth::{KeyCheck, MockApiKeyValidator};

fn unauthenticated(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_key(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_ping_needs_no_key() {
    let state = create_test_app_state();

    let response = send(app(&state), unauthenticated("/ping")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["timestamp"].is_string());
    assert_eq!(response.body["version"], env!("BUILD_INFO"));
    assert!(!env!("BUILD_INFO").is_empty());
}

#[tokio::test]
async fn test_missing_key_is_401_with_challenge() {
    let state = create_test_app_state();

    let response = send(app(&state), unauthenticated("/get_signal")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers[header::WWW_AUTHENTICATE], "ApiKey");
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "application/problem+json"
    );
    assert_eq!(response.body["status"], 401);
}

#[tokio::test]
async fn test_blank_key_counts_as_missing() {
    let state = create_test_app_state();

    let response = send(app(&state), with_key("/ea_status", "   ")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_key_is_403() {
    let state = create_test_app_state();

    let response = send(app(&state), with_key("/ea_status", "wrong-key")).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.headers[header::WWW_AUTHENTICATE], "ApiKey");
}

#[tokio::test]
async fn test_no_configured_keys_is_500() {
    let state = create_test_app_state_with(Config::default(), Arc::new(StaticApiKeys::default()));

    let response = send(app(&state), with_key("/ea_status", "anything")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], 500);
}

#[tokio::test]
async fn test_auth_runs_before_validation_and_mutation() {
    let state = create_test_app_state();
    let request = Request::builder()
        .method("POST")
        .uri("/send_signal")
        .header(API_KEY_HEADER, "wrong-key")
        .body(Body::from("not json"))
        .unwrap();

    let response = send(app(&state), request).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(state.bridge.signals().is_empty().await);
}

#[tokio::test]
async fn test_validator_is_consulted_with_presented_key() {
    let mut validator = MockApiKeyValidator::new();
    validator
        .expect_check()
        .with(eq("from-key-service"))
        .times(1)
        .returning(|_| KeyCheck::Valid);
    let state = create_test_app_state_with(Config::default(), Arc::new(validator));

    let response = send(app(&state), with_key("/get_signal", "from-key-service")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["type"], "NO_SIGNAL");
}

#[tokio::test]
async fn test_validator_not_consulted_without_key() {
    let mut validator = MockApiKeyValidator::new();
    validator.expect_check().never();
    let state = create_test_app_state_with(Config::default(), Arc::new(validator));

    let response = send(app(&state), unauthenticated("/get_signal")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validator_rejection_maps_to_403() {
    let mut validator = MockApiKeyValidator::new();
    validator.expect_check().returning(|_| KeyCheck::Invalid);
    let state = create_test_app_state_with(Config::default(), Arc::new(validator));

    let response = send(app(&state), with_key("/logs", "revoked")).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
