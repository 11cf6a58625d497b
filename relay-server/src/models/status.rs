// relay-server/src/models/status.rs
//
// Read-only views served by the status and history endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EaConnection, TradeResult};
use ea_bridge_protocol::EaIdentifier;

/// Body of `GET /ea_status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    /// Every EA known to the registry, including timed-out ones
    pub connected_eas: usize,
    pub pending_signals: usize,
    pub trade_results_count: usize,
    pub eas: BTreeMap<EaIdentifier, EaConnection>,
}

/// Body of `GET /trade_results`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeResultsPage {
    /// Oldest first
    pub results: Vec<TradeResult>,
    /// Results currently retained by the log
    pub total_count: usize,
}
