//! Shared bridge state
//!
//! `SignalBridge` owns the connection registry, the signal queue and the trade
//! result log. It is built once at startup and handed to the HTTP layer as axum
//! state; tests build their own isolated instances.

use chrono::Utc;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::connection_manager::ConnectionManager;
use crate::models::{BridgeSnapshot, PendingSignal, SignalRequest, TradeResultsPage};
use crate::signal_queue::SignalQueue;
use crate::trade_result_log::TradeResultLog;
use ea_bridge_protocol::ProtocolError;

mod dispatch;

pub use dispatch::Dispatched;

#[derive(Clone)]
pub struct SignalBridge {
    connections: Arc<ConnectionManager>,
    signals: SignalQueue,
    trade_results: TradeResultLog,
}

impl SignalBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            connections: Arc::new(ConnectionManager::new(config.heartbeat_timeout_seconds)),
            signals: SignalQueue::new(),
            trade_results: TradeResultLog::new(
                config.trade_result_capacity,
                config.default_results_limit,
            ),
        }
    }

    pub fn connections(&self) -> Arc<ConnectionManager> {
        self.connections.clone()
    }

    pub fn signals(&self) -> &SignalQueue {
        &self.signals
    }

    pub fn trade_results(&self) -> &TradeResultLog {
        &self.trade_results
    }

    /// Validate and queue a signal; returns the accepted signal id
    pub async fn submit_signal(&self, request: SignalRequest) -> Result<String, ProtocolError> {
        request.validate()?;

        let signal = request.into_pending(Utc::now());
        let signal_id = signal.signal_id.clone();
        let queued = self.signals.enqueue(signal).await;

        tracing::info!(
            signal_id = %signal_id,
            pending_signals = queued,
            "Signal queued"
        );
        Ok(signal_id)
    }

    /// Hand the oldest pending signal to the caller, if any
    pub async fn poll_signal(&self) -> Option<PendingSignal> {
        let signal = self.signals.dequeue().await;
        if let Some(signal) = &signal {
            tracing::info!(signal_id = %signal.signal_id, "Signal delivered");
        }
        signal
    }

    pub async fn snapshot(&self) -> BridgeSnapshot {
        let eas = self.connections.snapshot().await;
        BridgeSnapshot {
            connected_eas: eas.len(),
            pending_signals: self.signals.len().await,
            trade_results_count: self.trade_results.len().await,
            eas,
        }
    }

    pub async fn trade_results_page(&self, limit: Option<usize>) -> TradeResultsPage {
        TradeResultsPage {
            results: self.trade_results.list(limit).await,
            total_count: self.trade_results.len().await,
        }
    }

    /// Drop every registered EA, pending signal and recorded result
    pub async fn reset(&self) {
        self.connections.clear().await;
        self.signals.clear().await;
        self.trade_results.clear().await;
        tracing::warn!("Bridge state reset");
    }
}
