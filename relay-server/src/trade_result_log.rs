use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::TradeResult;

/// Append-only history of execution outcomes, bounded as a ring buffer
#[derive(Clone)]
pub struct TradeResultLog {
    entries: Arc<RwLock<VecDeque<TradeResult>>>,
    capacity: usize,
    default_limit: usize,
}

impl TradeResultLog {
    /// `capacity` is clamped to at least one entry
    pub fn new(capacity: usize, default_limit: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
            default_limit,
        }
    }

    /// Record a result; unknown signal ids are accepted as-is
    pub async fn append(&self, result: TradeResult) {
        let mut entries = self.entries.write().await;
        entries.push_back(result);

        while entries.len() > self.capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!(signal_id = %evicted.signal_id, "Trade result evicted");
            }
        }
    }

    /// The newest `limit` results, oldest first. `None` uses the default limit.
    pub async fn list(&self, limit: Option<usize>) -> Vec<TradeResult> {
        let limit = limit.unwrap_or(self.default_limit);
        let entries = self.entries.read().await;
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(id: &str) -> TradeResult {
        TradeResult {
            signal_id: id.to_string(),
            ticket: 1001,
            success: true,
            error_code: 0,
            error_message: String::new(),
            execution_price: 1.0850,
            slippage: 0.0,
            timestamp: Utc::now().to_rfc3339(),
            received_at: Utc::now(),
        }
    }

    fn ids(results: &[TradeResult]) -> Vec<&str> {
        results.iter().map(|r| r.signal_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_returns_most_recent_in_order() {
        let log = TradeResultLog::new(100, 100);
        for i in 1..=5 {
            log.append(result(&format!("SIG_{i}"))).await;
        }

        assert_eq!(ids(&log.list(Some(3)).await), vec!["SIG_3", "SIG_4", "SIG_5"]);
        assert_eq!(log.list(None).await.len(), 5);
    }

    #[tokio::test]
    async fn test_default_limit_applies() {
        let log = TradeResultLog::new(100, 2);
        for i in 1..=4 {
            log.append(result(&format!("SIG_{i}"))).await;
        }

        assert_eq!(ids(&log.list(None).await), vec!["SIG_3", "SIG_4"]);
    }

    #[tokio::test]
    async fn test_zero_limit_is_empty() {
        let log = TradeResultLog::new(10, 10);
        log.append(result("SIG_1")).await;

        assert!(log.list(Some(0)).await.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let log = TradeResultLog::new(3, 100);
        for i in 1..=5 {
            log.append(result(&format!("SIG_{i}"))).await;
        }

        assert_eq!(log.len().await, 3);
        assert_eq!(ids(&log.list(None).await), vec!["SIG_3", "SIG_4", "SIG_5"]);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let log = TradeResultLog::new(0, 10);
        assert_eq!(log.capacity(), 1);

        log.append(result("SIG_1")).await;
        log.append(result("SIG_2")).await;
        assert_eq!(ids(&log.list(None).await), vec!["SIG_2"]);
    }

    #[tokio::test]
    async fn test_failed_result_is_kept() {
        let log = TradeResultLog::new(10, 10);
        let mut failed = result("SIG_X");
        failed.success = false;
        failed.ticket = 0;
        failed.error_code = 134;
        failed.error_message = "Not enough money".to_string();
        log.append(failed.clone()).await;

        assert_eq!(log.list(None).await, vec![failed]);
    }

    #[tokio::test]
    async fn test_clear() {
        let log = TradeResultLog::new(10, 10);
        log.append(result("SIG_1")).await;
        log.clear().await;

        assert!(log.is_empty().await);
    }
}
