use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::PendingSignal;

/// Single FIFO shared by every polling EA
///
/// The queue is unbounded and accepts duplicate signal ids. A signal leaves the
/// queue exactly once, through `dequeue`.
#[derive(Clone, Default)]
pub struct SignalQueue {
    inner: Arc<Mutex<VecDeque<PendingSignal>>>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail; returns the queue length after the insert
    pub async fn enqueue(&self, signal: PendingSignal) -> usize {
        let mut queue = self.inner.lock().await;
        queue.push_back(signal);
        queue.len()
    }

    /// Pop the head. Check and removal happen under one lock so two pollers
    /// can never receive the same signal.
    pub async fn dequeue(&self) -> Option<PendingSignal> {
        self.inner.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn signal(id: &str) -> PendingSignal {
        PendingSignal {
            signal_id: id.to_string(),
            instrument: "EURUSD".to_string(),
            action: "BUY".to_string(),
            volume: 0.1,
            stop_loss: None,
            take_profit: None,
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = SignalQueue::new();
        for i in 1..=5 {
            assert_eq!(queue.enqueue(signal(&format!("SIG_{i}"))).await, i);
        }

        for i in 1..=5 {
            let next = queue.dequeue().await.unwrap();
            assert_eq!(next.signal_id, format!("SIG_{i}"));
        }
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_queue_dequeue_returns_none() {
        let queue = SignalQueue::new();
        assert!(queue.is_empty().await);
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_kept() {
        let queue = SignalQueue::new();
        queue.enqueue(signal("SIG_1")).await;
        queue.enqueue(signal("SIG_1")).await;

        assert_eq!(queue.len().await, 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let queue = SignalQueue::new();
        queue.enqueue(signal("SIG_1")).await;
        queue.clear().await;

        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_pollers_single_signal() {
        let queue = SignalQueue::new();
        queue.enqueue(signal("ONLY")).await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.dequeue().await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_pollers_never_duplicate() {
        let queue = SignalQueue::new();
        for i in 0..200 {
            queue.enqueue(signal(&format!("SIG_{i}"))).await;
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut taken = Vec::new();
                    while let Some(s) = queue.dequeue().await {
                        taken.push(s.signal_id);
                    }
                    taken
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(seen.insert(id), "signal delivered twice");
            }
        }
        assert_eq!(seen.len(), 200);
    }
}
