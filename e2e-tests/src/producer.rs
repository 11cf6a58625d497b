// e2e-tests/src/producer.rs
//
// SignalProducer: the upstream strategy side that pushes signals in.

use anyhow::{Context, Result};
use ea_bridge_protocol::{SignalAcceptedResponse, SignalRequest, API_KEY_HEADER};
use reqwest::{Client, StatusCode};

pub struct SignalProducer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SignalProducer {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Market order without stops
    pub fn market(signal_id: &str, instrument: &str, action: &str, volume: f64) -> SignalRequest {
        SignalRequest {
            signal_id: signal_id.to_string(),
            instrument: instrument.to_string(),
            action: action.to_string(),
            volume,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Submit and return the accepted signal id
    pub async fn send(&self, signal: &SignalRequest) -> Result<String> {
        let accepted: SignalAcceptedResponse = self
            .request(signal)
            .await?
            .error_for_status()
            .context("Signal rejected")?
            .json()
            .await
            .context("Invalid /send_signal response")?;
        Ok(accepted.signal_id)
    }

    /// Submit and return only the status, for rejection tests
    pub async fn try_send(&self, signal: &SignalRequest) -> Result<StatusCode> {
        Ok(self.request(signal).await?.status())
    }

    async fn request(&self, signal: &SignalRequest) -> Result<reqwest::Response> {
        self.client
            .post(format!("{}/send_signal", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(signal)
            .send()
            .await
            .context("POST /send_signal failed")
    }
}
