//! HTTP dispatch layer
//!
//! Every route except `/ping` sits behind the `X-API-Key` middleware. Request
//! bodies and queries go through extractors that reject with 422 Problem
//! Details, and handlers forward into the shared `SignalBridge`.

mod admin;
mod ea;
mod error;
mod extract;
mod logs;
mod middleware;
mod signals;
mod status;

#[cfg(test)]
mod tests;

pub use error::{ApiResult, ProblemDetails};
pub use extract::{ValidJson, ValidQuery};
pub use middleware::require_api_key;
pub use status::{PingResponse, TradeResultsQuery};

use axum::{
    http::{header, HeaderName, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

use crate::{auth::ApiKeyValidator, bridge::SignalBridge, config::Config, log_buffer::LogBuffer};

#[derive(Clone)]
pub struct AppState {
    pub bridge: SignalBridge,
    pub validator: Arc<dyn ApiKeyValidator>,
    pub log_buffer: LogBuffer,
    pub allowed_origins: Vec<String>,
    pub cors_disabled: bool,
    pub config: Arc<Config>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = if state.cors_disabled {
        tracing::warn!(
            "CORS is DISABLED - allowing all origins. This should only be used in development!"
        );
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(
                state
                    .allowed_origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")])
    };

    // Headers stay out of the span: they carry the API key
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "HTTP request started"
            );
        })
        .on_response(
            DefaultOnResponse::new()
                .level(tracing::Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let protected = Router::new()
        .route("/get_signal", get(signals::get_signal))
        .route("/send_signal", post(signals::send_signal))
        .route("/ea_info", post(ea::ea_info))
        .route("/heartbeat", post(ea::heartbeat))
        .route("/account_status", post(ea::account_status))
        .route("/trade_result", post(ea::trade_result))
        .route("/ea_status", get(status::ea_status))
        .route("/trade_results", get(status::trade_results))
        .route("/logs", get(logs::get_logs))
        .route("/admin/reset", post(admin::reset))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/ping", get(status::ping))
        .merge(protected)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
