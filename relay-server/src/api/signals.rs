use axum::{extract::State, Json};

use super::{extract::ValidJson, ApiResult, AppState};
use crate::models::{SignalPoll, SignalRequest};
use ea_bridge_protocol::SignalAcceptedResponse;

/// Queue a signal for the next polling EA
pub async fn send_signal(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignalRequest>,
) -> ApiResult<Json<SignalAcceptedResponse>> {
    let signal_id = state.bridge.submit_signal(request).await.map_err(|err| {
        tracing::warn!(error = %err, "Signal rejected");
        err
    })?;

    Ok(Json(SignalAcceptedResponse::success(signal_id)))
}

/// Oldest pending signal, or `NO_SIGNAL` when the queue is empty
pub async fn get_signal(State(state): State<AppState>) -> Json<SignalPoll> {
    Json(SignalPoll::from(state.bridge.poll_signal().await))
}
