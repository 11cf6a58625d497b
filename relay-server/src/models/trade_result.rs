use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ea_bridge_protocol::TradeResultData;

/// One execution outcome as kept in the trade result log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub signal_id: String,
    pub ticket: i64,
    pub success: bool,
    pub error_code: i32,
    pub error_message: String,
    pub execution_price: f64,
    pub slippage: f64,
    /// Timestamp from the EA envelope, verbatim
    pub timestamp: String,
    pub received_at: DateTime<Utc>,
}

impl TradeResult {
    pub fn from_report(
        data: TradeResultData,
        timestamp: String,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            signal_id: data.signal_id,
            ticket: data.ticket,
            success: data.success,
            error_code: data.error_code,
            error_message: data.error_message,
            execution_price: data.execution_price,
            slippage: data.slippage,
            timestamp,
            received_at,
        }
    }
}
