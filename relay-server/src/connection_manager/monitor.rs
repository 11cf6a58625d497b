use std::sync::Arc;
use std::time::Duration;

use super::ConnectionManager;
use crate::models::EaIdentifier;

/// Periodically flags EAs that stopped talking to the bridge
pub struct TimeoutMonitor {
    connection_manager: Arc<ConnectionManager>,
    check_interval: Duration,
}

impl TimeoutMonitor {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self {
            connection_manager,
            check_interval: Duration::from_secs(10),
        }
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Runs until the owning task is aborted
    pub async fn run(self) {
        tracing::info!(
            interval_seconds = self.check_interval.as_secs(),
            "Timeout monitor started"
        );
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.check_timeouts().await;
        }
    }

    pub async fn check_timeouts(&self) -> Vec<EaIdentifier> {
        self.connection_manager.check_timeouts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectionStatus, HeartbeatData};

    fn heartbeat(account: i64, magic_number: u64) -> HeartbeatData {
        HeartbeatData {
            status: "active".to_string(),
            positions: 0,
            pending_orders: 0,
            last_signal: None,
            account,
            magic_number,
        }
    }

    #[tokio::test]
    async fn test_monitor_detects_timeouts() {
        let cm = Arc::new(ConnectionManager::new(1));
        let ea_id = cm.update_heartbeat(heartbeat(123456, 7)).await;

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let monitor = TimeoutMonitor::new(cm.clone());
        let timed_out = monitor.check_timeouts().await;

        assert_eq!(timed_out, vec![ea_id.clone()]);
        let conn = cm.get(&ea_id).await.unwrap();
        assert_eq!(conn.connection_status, ConnectionStatus::Timeout);
    }

    #[tokio::test]
    async fn test_monitor_loop_runs_on_interval() {
        let cm = Arc::new(ConnectionManager::new(0));
        let ea_id = cm.update_heartbeat(heartbeat(1, 1)).await;

        let handle = tokio::spawn(
            TimeoutMonitor::new(cm.clone())
                .with_check_interval(Duration::from_millis(20))
                .run(),
        );
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.abort();

        let conn = cm.get(&ea_id).await.unwrap();
        assert_eq!(conn.connection_status, ConnectionStatus::Timeout);
        // Entries are flagged, never removed
        assert_eq!(cm.len().await, 1);
    }
}
