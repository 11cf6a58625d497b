//! Liveness, registry and history endpoints

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{extract::ValidQuery, AppState};
use crate::models::{BridgeSnapshot, TradeResultsPage};
use ea_bridge_protocol::RESPONSE_STATUS_OK;

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub timestamp: String,
    pub message: String,
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TradeResultsQuery {
    pub limit: Option<usize>,
}

/// Unauthenticated liveness probe
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: RESPONSE_STATUS_OK.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        message: "EA Signal Bridge is running".to_string(),
        version: env!("BUILD_INFO").to_string(),
    })
}

pub async fn ea_status(State(state): State<AppState>) -> Json<BridgeSnapshot> {
    let snapshot = state.bridge.snapshot().await;

    tracing::debug!(
        connected_eas = snapshot.connected_eas,
        pending_signals = snapshot.pending_signals,
        "Status requested"
    );

    Json(snapshot)
}

pub async fn trade_results(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<TradeResultsQuery>,
) -> Json<TradeResultsPage> {
    Json(state.bridge.trade_results_page(query.limit).await)
}
