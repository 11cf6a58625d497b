//! API key middleware
//!
//! Runs before any extractor on protected routes, so a request that fails
//! authentication never reaches payload validation or bridge state.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{AppState, ProblemDetails};
use crate::auth::KeyCheck;
use ea_bridge_protocol::API_KEY_HEADER;

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ProblemDetails> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    let Some(key) = presented else {
        tracing::warn!(uri = %request.uri(), "Request without API key rejected");
        return Err(ProblemDetails::unauthorized("Missing X-API-Key header")
            .with_instance(request.uri().path()));
    };

    match state.validator.check(&key).await {
        KeyCheck::Valid => Ok(next.run(request).await),
        KeyCheck::Invalid => {
            // Only the length; the key itself never reaches the logs
            tracing::warn!(
                uri = %request.uri(),
                key_length = key.len(),
                "Invalid API key rejected"
            );
            Err(ProblemDetails::forbidden("Invalid API key").with_instance(request.uri().path()))
        }
        KeyCheck::NotConfigured => {
            tracing::error!("Authenticated request refused: no API keys configured");
            Err(ProblemDetails::misconfigured("No API keys are configured on the server"))
        }
    }
}
