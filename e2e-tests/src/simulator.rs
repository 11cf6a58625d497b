// e2e-tests/src/simulator.rs
//
// EaSimulator: behaves like the MQL EA on the other end of the bridge.
//
// The real EA registers once, then on every timer tick sends a heartbeat,
// polls /get_signal, executes what it receives and reports the outcome.
// Each step is exposed separately so tests can drive the timeline.

use anyhow::{Context, Result};
use ea_bridge_protocol::{
    AccountStatusData, EaAckResponse, EaEnvelope, EaIdentifier, EaInfoData, EaMessage,
    HeartbeatData, PendingSignal, SignalPoll, TradeResultData, API_KEY_HEADER,
};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// What the simulated terminal did with a signal
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Filled { ticket: i64, price: f64, slippage: f64 },
    Rejected { error_code: i32, error_message: String },
}

pub struct EaSimulator {
    client: Client,
    base_url: String,
    api_key: String,
    account: i64,
    magic_number: u64,
    symbol: String,
    positions: i32,
    last_signal: Option<String>,
}

impl EaSimulator {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: &str,
        account: i64,
        magic_number: u64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            account,
            magic_number,
            symbol: "EURUSD".to_string(),
            positions: 0,
            last_signal: None,
        }
    }

    pub fn ea_id(&self) -> EaIdentifier {
        EaIdentifier::new(self.account, self.magic_number)
    }

    pub fn positions(&self) -> i32 {
        self.positions
    }

    pub fn last_signal(&self) -> Option<&str> {
        self.last_signal.as_deref()
    }

    pub async fn register(&self) -> Result<EaIdentifier> {
        let message = EaMessage::EaInfo(EaInfoData {
            name: "SignalBridgeEA".to_string(),
            version: "1.0".to_string(),
            account: self.account,
            broker: "DemoBroker".to_string(),
            symbol: self.symbol.clone(),
            timeframe: "H1".to_string(),
            magic_number: self.magic_number,
        });
        self.send_ea_message("/ea_info", message).await
    }

    pub async fn heartbeat(&self) -> Result<EaIdentifier> {
        let message = EaMessage::Heartbeat(HeartbeatData {
            status: "active".to_string(),
            positions: self.positions,
            pending_orders: 0,
            last_signal: self.last_signal.clone(),
            account: self.account,
            magic_number: self.magic_number,
        });
        self.send_ea_message("/heartbeat", message).await
    }

    pub async fn account_status(&self, balance: f64, profit: f64) -> Result<EaIdentifier> {
        let margin = 100.0 * f64::from(self.positions);
        let equity = balance + profit;
        let message = EaMessage::AccountStatus(AccountStatusData {
            balance,
            equity,
            margin,
            free_margin: equity - margin,
            margin_level: if margin > 0.0 { equity / margin * 100.0 } else { 0.0 },
            profit,
            open_positions: self.positions,
            account: self.account,
            magic_number: self.magic_number,
        });
        self.send_ea_message("/account_status", message).await
    }

    pub async fn poll_signal(&self) -> Result<Option<PendingSignal>> {
        let poll: SignalPoll = self
            .client
            .get(self.url("/get_signal"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("GET /get_signal failed")?
            .error_for_status()?
            .json()
            .await
            .context("Invalid /get_signal response")?;

        Ok(match poll {
            SignalPoll::Signal(signal) => Some(signal),
            SignalPoll::NoSignal => None,
        })
    }

    pub async fn report(&self, signal_id: &str, outcome: &ExecutionOutcome) -> Result<()> {
        let data = match outcome {
            ExecutionOutcome::Filled {
                ticket,
                price,
                slippage,
            } => TradeResultData {
                signal_id: signal_id.to_string(),
                ticket: *ticket,
                success: true,
                error_code: 0,
                error_message: String::new(),
                execution_price: *price,
                slippage: *slippage,
            },
            ExecutionOutcome::Rejected {
                error_code,
                error_message,
            } => TradeResultData {
                signal_id: signal_id.to_string(),
                ticket: 0,
                success: false,
                error_code: *error_code,
                error_message: error_message.clone(),
                execution_price: 0.0,
                slippage: 0.0,
            },
        };

        let envelope = EaEnvelope::new(EaMessage::TradeResult(data));
        self.post("/trade_result", &envelope)
            .await?
            .error_for_status()
            .context("Trade result rejected")?;
        Ok(())
    }

    /// One timer tick: poll, execute with `outcome`, report. Returns the
    /// signal handled, if any.
    pub async fn execute_next(
        &mut self,
        outcome: ExecutionOutcome,
    ) -> Result<Option<PendingSignal>> {
        let Some(signal) = self.poll_signal().await? else {
            return Ok(None);
        };

        self.report(&signal.signal_id, &outcome).await?;
        if matches!(outcome, ExecutionOutcome::Filled { .. }) {
            self.positions += 1;
        }
        self.last_signal = Some(signal.signal_id.clone());

        tracing::debug!(ea_id = %self.ea_id(), signal_id = %signal.signal_id, "Signal executed");
        Ok(Some(signal))
    }

    /// Post an arbitrary body and return only the status, for negative tests
    pub async fn post_raw(&self, path: &str, body: &serde_json::Value) -> Result<StatusCode> {
        Ok(self.post(path, body).await?.status())
    }

    async fn send_ea_message(&self, path: &str, message: EaMessage) -> Result<EaIdentifier> {
        let envelope = EaEnvelope::new(message);
        let ack: EaAckResponse = self
            .post(path, &envelope)
            .await?
            .error_for_status()
            .with_context(|| format!("POST {} rejected", path))?
            .json()
            .await
            .with_context(|| format!("Invalid response from {}", path))?;
        Ok(ack.ea_id)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        self.client
            .post(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
