// e2e-tests/src/sandbox.rs
//
// TestSandbox: an isolated bridge server plus factories for the clients that
// talk to it.
//
// Every sandbox owns its own SignalBridge and listener, so tests can run in
// parallel without sharing queue or registry state. The server task is
// aborted on Drop.

use anyhow::{Context, Result};
use ea_signal_bridge::{
    api::{create_router, AppState},
    auth::StaticApiKeys,
    bridge::SignalBridge,
    config::Config,
    log_buffer::create_log_buffer,
    models::{BridgeSnapshot, TradeResultsPage},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::producer::SignalProducer;
use crate::simulator::EaSimulator;
use crate::SANDBOX_API_KEY;

pub struct TestSandbox {
    base_url: String,
    bridge: SignalBridge,
    client: reqwest::Client,
    server_handle: JoinHandle<()>,
}

impl TestSandbox {
    pub async fn new() -> Result<Self> {
        Self::with_config(Config::default()).await
    }

    /// Start a sandbox with custom settings (auth keys in `config` are ignored;
    /// the sandbox always accepts `SANDBOX_API_KEY`)
    pub async fn with_config(config: Config) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind sandbox listener")?;
        let port = listener.local_addr()?.port();

        let bridge = SignalBridge::new(&config.bridge);
        let state = AppState {
            bridge: bridge.clone(),
            validator: Arc::new(StaticApiKeys::new([SANDBOX_API_KEY])),
            log_buffer: create_log_buffer(config.logging.buffer_capacity),
            allowed_origins: vec![],
            cors_disabled: true,
            config: Arc::new(config),
        };
        let router = create_router(state);

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Sandbox server failed: {}", e);
            }
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            bridge,
            client: reqwest::Client::new(),
            server_handle,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Direct handle on the server's state, for assertions
    pub fn bridge(&self) -> &SignalBridge {
        &self.bridge
    }

    pub fn create_ea(&self, account: i64, magic_number: u64) -> EaSimulator {
        EaSimulator::new(
            self.client.clone(),
            &self.base_url,
            SANDBOX_API_KEY,
            account,
            magic_number,
        )
    }

    pub fn create_producer(&self) -> SignalProducer {
        SignalProducer::new(self.client.clone(), &self.base_url, SANDBOX_API_KEY)
    }

    /// `GET /ea_status` through HTTP
    pub async fn status(&self) -> Result<BridgeSnapshot> {
        self.get_json("/ea_status").await
    }

    /// `GET /trade_results` through HTTP
    pub async fn trade_results(&self, limit: Option<usize>) -> Result<TradeResultsPage> {
        match limit {
            Some(limit) => self.get_json(&format!("/trade_results?limit={}", limit)).await,
            None => self.get_json("/trade_results").await,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(ea_bridge_protocol::API_KEY_HEADER, SANDBOX_API_KEY)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?
            .error_for_status()?;
        response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", path))
    }
}

impl Drop for TestSandbox {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}
