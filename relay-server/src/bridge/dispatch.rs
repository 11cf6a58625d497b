use chrono::Utc;

use super::SignalBridge;
use crate::models::{EaEnvelope, EaIdentifier, EaMessage, MessageKind, TradeResult};
use ea_bridge_protocol::ProtocolError;

/// What a dispatched EA message touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Registry updated for this EA
    Ea(EaIdentifier),
    /// Result appended to the trade result log
    TradeRecorded { signal_id: String },
}

impl SignalBridge {
    /// Dispatch an envelope that arrived on the endpoint for `expected`
    pub async fn handle_envelope(
        &self,
        envelope: EaEnvelope,
        expected: MessageKind,
    ) -> Result<Dispatched, ProtocolError> {
        let timestamp = envelope.timestamp.clone();
        let message = envelope.expect_kind(expected)?;
        Ok(self.handle_message(message, timestamp).await)
    }

    pub async fn handle_message(&self, message: EaMessage, timestamp: String) -> Dispatched {
        match message {
            EaMessage::EaInfo(info) => {
                Dispatched::Ea(self.connections.register_or_update(info).await)
            }
            EaMessage::Heartbeat(heartbeat) => {
                Dispatched::Ea(self.connections.update_heartbeat(heartbeat).await)
            }
            EaMessage::AccountStatus(status) => {
                Dispatched::Ea(self.connections.update_account_status(status).await)
            }
            EaMessage::TradeResult(data) => {
                let result = TradeResult::from_report(data, timestamp, Utc::now());
                let signal_id = result.signal_id.clone();

                if result.success {
                    tracing::info!(
                        signal_id = %signal_id,
                        ticket = result.ticket,
                        execution_price = result.execution_price,
                        "Trade executed"
                    );
                } else {
                    tracing::warn!(
                        signal_id = %signal_id,
                        error_code = result.error_code,
                        error_message = %result.error_message,
                        "Trade failed"
                    );
                }

                self.trade_results.append(result).await;
                Dispatched::TradeRecorded { signal_id }
            }
        }
    }
}
