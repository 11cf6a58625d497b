//! Router-level tests
//!
//! Requests go through the full router (auth middleware, extractors, handlers)
//! with `tower::ServiceExt::oneshot`.

mod auth_tests;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::api::{create_router, AppState};
use crate::auth::{ApiKeyValidator, StaticApiKeys};
use crate::bridge::SignalBridge;
use crate::config::Config;
use crate::log_buffer::create_log_buffer;
use ea_bridge_protocol::API_KEY_HEADER;

pub(crate) const TEST_API_KEY: &str = "test-api-key";

pub(crate) fn create_test_app_state() -> AppState {
    create_test_app_state_with(
        Config::default(),
        Arc::new(StaticApiKeys::new([TEST_API_KEY])),
    )
}

pub(crate) fn create_test_app_state_with(
    config: Config,
    validator: Arc<dyn ApiKeyValidator>,
) -> AppState {
    AppState {
        bridge: SignalBridge::new(&config.bridge),
        validator,
        log_buffer: create_log_buffer(config.logging.buffer_capacity),
        allowed_origins: vec![],
        cors_disabled: true,
        config: Arc::new(config),
    }
}

pub(crate) fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub(crate) async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is not JSON")
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, TEST_API_KEY)
        .body(Body::empty())
        .unwrap()
}

pub(crate) fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

pub(crate) fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(API_KEY_HEADER, TEST_API_KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub(crate) fn envelope(message_type: &str, data: Value) -> Value {
    json!({
        "type": message_type,
        "data": data,
        "timestamp": "2024-01-15T10:30:00Z"
    })
}

pub(crate) fn ea_info_envelope(account: i64, magic_number: u64) -> Value {
    envelope(
        "EA_INFO",
        json!({
            "name": "SignalBridgeEA",
            "version": "1.0",
            "account": account,
            "broker": "DemoBroker",
            "symbol": "EURUSD",
            "timeframe": "H1",
            "magic_number": magic_number
        }),
    )
}

pub(crate) fn heartbeat_envelope(account: i64, magic_number: u64) -> Value {
    envelope(
        "HEARTBEAT",
        json!({
            "status": "active",
            "positions": 1,
            "pending_orders": 0,
            "last_signal": "SIG_1",
            "account": account,
            "magic_number": magic_number
        }),
    )
}

pub(crate) fn signal_body(signal_id: &str) -> Value {
    json!({
        "signal_id": signal_id,
        "instrument": "EURUSD",
        "action": "BUY",
        "volume": 0.1,
        "stop_loss": 1.0800,
        "take_profit": 1.0900
    })
}
