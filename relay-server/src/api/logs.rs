use axum::{extract::State, Json};

use super::AppState;
use crate::log_buffer::LogEntry;

/// Recent server log entries, newest first
pub async fn get_logs(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    let buffer = state.log_buffer.read().await;
    let logs: Vec<_> = buffer.iter().cloned().collect();

    tracing::debug!(count = logs.len(), "Retrieved server logs");

    Json(logs)
}
