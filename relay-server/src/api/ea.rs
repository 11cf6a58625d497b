//! Endpoints the EA posts its envelopes to

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use super::{extract::ValidJson, ApiResult, AppState};
use crate::bridge::Dispatched;
use crate::models::{EaEnvelope, MessageKind};
use ea_bridge_protocol::{AckResponse, EaAckResponse};

pub async fn ea_info(
    State(state): State<AppState>,
    ValidJson(envelope): ValidJson<EaEnvelope>,
) -> ApiResult<Response> {
    dispatch(&state, envelope, MessageKind::EaInfo).await
}

pub async fn heartbeat(
    State(state): State<AppState>,
    ValidJson(envelope): ValidJson<EaEnvelope>,
) -> ApiResult<Response> {
    dispatch(&state, envelope, MessageKind::Heartbeat).await
}

pub async fn account_status(
    State(state): State<AppState>,
    ValidJson(envelope): ValidJson<EaEnvelope>,
) -> ApiResult<Response> {
    dispatch(&state, envelope, MessageKind::AccountStatus).await
}

pub async fn trade_result(
    State(state): State<AppState>,
    ValidJson(envelope): ValidJson<EaEnvelope>,
) -> ApiResult<Response> {
    dispatch(&state, envelope, MessageKind::TradeResult).await
}

async fn dispatch(
    state: &AppState,
    envelope: EaEnvelope,
    expected: MessageKind,
) -> ApiResult<Response> {
    let found = envelope.message.kind();
    let dispatched = state
        .bridge
        .handle_envelope(envelope, expected)
        .await
        .map_err(|err| {
            tracing::warn!(expected = %expected, found = %found, "Envelope rejected");
            err
        })?;

    Ok(match dispatched {
        Dispatched::Ea(ea_id) => Json(EaAckResponse::success(ea_id)).into_response(),
        Dispatched::TradeRecorded { .. } => Json(AckResponse::success()).into_response(),
    })
}
