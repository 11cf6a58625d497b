use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::auth::{ApiKeyValidator, StaticApiKeys};
use crate::bridge::SignalBridge;
use crate::config::Config;
use crate::connection_manager::monitor::TimeoutMonitor;

pub struct ServiceRegistry {
    pub bridge: SignalBridge,
    pub validator: Arc<dyn ApiKeyValidator>,
    pub monitor: JoinHandle<()>,
}

/// Build the bridge state and start the heartbeat timeout monitor
pub fn setup(config: &Config) -> Result<ServiceRegistry> {
    let bridge = SignalBridge::new(&config.bridge);
    tracing::info!(
        trade_result_capacity = bridge.trade_results().capacity(),
        heartbeat_timeout_seconds = config.bridge.heartbeat_timeout_seconds,
        "Signal bridge initialized"
    );

    let validator: Arc<dyn ApiKeyValidator> = Arc::new(StaticApiKeys::from_config(&config.auth));

    let interval = Duration::from_secs(config.bridge.monitor_interval_seconds.max(1));
    let monitor = TimeoutMonitor::new(bridge.connections()).with_check_interval(interval);
    let monitor = tokio::spawn(monitor.run());

    Ok(ServiceRegistry {
        bridge,
        validator,
        monitor,
    })
}
