use axum::{extract::State, Json};

use super::{ApiResult, AppState, ProblemDetails};
use ea_bridge_protocol::AckResponse;

/// Clear registry, queue and log. Hidden unless `admin.enable_reset` is set.
pub async fn reset(State(state): State<AppState>) -> ApiResult<Json<AckResponse>> {
    if !state.config.admin.enable_reset {
        return Err(ProblemDetails::not_found("Endpoint").with_instance("/admin/reset"));
    }

    state.bridge.reset().await;
    Ok(Json(AckResponse::success()))
}
