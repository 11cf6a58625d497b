use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{
    AccountStatusData, ConnectionStatus, EaConnection, EaIdentifier, EaInfoData, HeartbeatData,
};

pub mod monitor;

/// Registry of every EA that has talked to the bridge, keyed by `EaIdentifier`
///
/// Entries are created by whichever message arrives first and are never evicted;
/// only `clear()` removes them.
#[derive(Clone)]
pub struct ConnectionManager {
    connections: Arc<RwLock<HashMap<EaIdentifier, EaConnection>>>,
    timeout_seconds: i64,
}

impl ConnectionManager {
    pub fn new(timeout_seconds: i64) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            timeout_seconds,
        }
    }

    /// Store registration metadata from `EA_INFO`
    pub async fn register_or_update(&self, info: EaInfoData) -> EaIdentifier {
        let ea_id = info.ea_id();
        let now = Utc::now();

        let mut connections = self.connections.write().await;
        let conn = connections.entry(ea_id.clone()).or_insert_with(|| {
            tracing::info!(ea_id = %ea_id, name = %info.name, "EA registered");
            EaConnection::new(ea_id.clone(), info.account, info.magic_number, now)
        });
        conn.apply_info(info, now);

        ea_id
    }

    /// Heartbeat with auto-registration for EAs whose `EA_INFO` was never seen
    pub async fn update_heartbeat(&self, heartbeat: HeartbeatData) -> EaIdentifier {
        let ea_id = heartbeat.ea_id();
        let now = Utc::now();

        let mut connections = self.connections.write().await;
        let conn = connections.entry(ea_id.clone()).or_insert_with(|| {
            tracing::info!(ea_id = %ea_id, "Auto-registering EA from heartbeat");
            EaConnection::new(ea_id.clone(), heartbeat.account, heartbeat.magic_number, now)
        });

        tracing::debug!(
            ea_id = %ea_id,
            status = %heartbeat.status,
            positions = heartbeat.positions,
            pending_orders = heartbeat.pending_orders,
            "Heartbeat received"
        );
        conn.apply_heartbeat(heartbeat, now);

        ea_id
    }

    pub async fn update_account_status(&self, status: AccountStatusData) -> EaIdentifier {
        let ea_id = status.ea_id();
        let now = Utc::now();

        let mut connections = self.connections.write().await;
        let conn = connections.entry(ea_id.clone()).or_insert_with(|| {
            tracing::info!(ea_id = %ea_id, "Auto-registering EA from account status");
            EaConnection::new(ea_id.clone(), status.account, status.magic_number, now)
        });

        tracing::debug!(
            ea_id = %ea_id,
            balance = status.balance,
            equity = status.equity,
            "Account status received"
        );
        conn.apply_account_status(status, now);

        ea_id
    }

    pub async fn get(&self, ea_id: &EaIdentifier) -> Option<EaConnection> {
        self.connections.read().await.get(ea_id).cloned()
    }

    /// All entries, online and timed out, ordered by id
    pub async fn snapshot(&self) -> BTreeMap<EaIdentifier, EaConnection> {
        let connections = self.connections.read().await;
        connections
            .iter()
            .map(|(id, conn)| (id.clone(), conn.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.connections.write().await.clear();
    }

    /// Mark silent EAs as `Timeout`; returns the ids that changed state
    pub async fn check_timeouts(&self) -> Vec<EaIdentifier> {
        self.check_timeouts_at(Utc::now()).await
    }

    pub(crate) async fn check_timeouts_at(&self, now: DateTime<Utc>) -> Vec<EaIdentifier> {
        let timeout_duration = Duration::seconds(self.timeout_seconds);

        let mut connections = self.connections.write().await;
        let mut timed_out = Vec::new();

        for (ea_id, conn) in connections.iter_mut() {
            if conn.connection_status == ConnectionStatus::Online {
                let elapsed = now.signed_duration_since(conn.updated_at);

                if elapsed > timeout_duration {
                    tracing::warn!(
                        ea_id = %ea_id,
                        elapsed_seconds = elapsed.num_seconds(),
                        "EA timed out"
                    );
                    conn.connection_status = ConnectionStatus::Timeout;
                    timed_out.push(ea_id.clone());
                }
            }
        }

        if !timed_out.is_empty() {
            tracing::info!(
                "Timed out EAs: {:?}",
                timed_out.iter().map(EaIdentifier::as_str).collect::<Vec<_>>()
            );
        }

        timed_out
    }
}
