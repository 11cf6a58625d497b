use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ea_bridge_protocol::{AccountStatusData, EaIdentifier, EaInfoData, HeartbeatData};

/// Last known state of one EA instance
///
/// Registration fields stay `None` until an `EA_INFO` arrives, so an EA whose
/// registration was lost still shows up from its heartbeats alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EaConnection {
    pub ea_id: EaIdentifier,
    pub account: i64,
    pub magic_number: u64,
    pub name: Option<String>,
    pub version: Option<String>,
    pub broker: Option<String>,
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    /// Status string from the last heartbeat (e.g. "active")
    pub status: Option<String>,
    pub positions: i32,
    pub pending_orders: i32,
    pub last_signal: Option<String>,
    pub account_status: Option<AccountSnapshot>,
    pub connection_status: ConnectionStatus,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
    /// Any message from this EA; drives the timeout monitor
    pub updated_at: DateTime<Utc>,
}

/// Balance and margin figures from the last `ACCOUNT_STATUS`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub equity: f64,
    pub margin: f64,
    pub free_margin: f64,
    pub margin_level: f64,
    pub profit: f64,
    pub open_positions: i32,
    pub reported_at: DateTime<Utc>,
}

/// Liveness as judged by the timeout monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConnectionStatus {
    Online,
    Timeout,
}

impl EaConnection {
    /// Minimal entry for an EA seen for the first time
    pub fn new(ea_id: EaIdentifier, account: i64, magic_number: u64, now: DateTime<Utc>) -> Self {
        Self {
            ea_id,
            account,
            magic_number,
            name: None,
            version: None,
            broker: None,
            symbol: None,
            timeframe: None,
            status: None,
            positions: 0,
            pending_orders: 0,
            last_signal: None,
            account_status: None,
            connection_status: ConnectionStatus::Online,
            last_heartbeat: None,
            registered_at: now,
            updated_at: now,
        }
    }

    pub fn apply_info(&mut self, info: EaInfoData, now: DateTime<Utc>) {
        self.name = Some(info.name);
        self.version = Some(info.version);
        self.broker = Some(info.broker);
        self.symbol = Some(info.symbol);
        self.timeframe = Some(info.timeframe);
        self.last_heartbeat = Some(now);
        self.touch(now);
    }

    pub fn apply_heartbeat(&mut self, heartbeat: HeartbeatData, now: DateTime<Utc>) {
        self.status = Some(heartbeat.status);
        self.positions = heartbeat.positions;
        self.pending_orders = heartbeat.pending_orders;
        self.last_signal = heartbeat.last_signal.filter(|s| !s.is_empty());
        self.last_heartbeat = Some(now);
        self.touch(now);
    }

    pub fn apply_account_status(&mut self, status: AccountStatusData, now: DateTime<Utc>) {
        self.account_status = Some(AccountSnapshot {
            balance: status.balance,
            equity: status.equity,
            margin: status.margin,
            free_margin: status.free_margin,
            margin_level: status.margin_level,
            profit: status.profit,
            open_positions: status.open_positions,
            reported_at: now,
        });
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.connection_status = ConnectionStatus::Online;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat(last_signal: Option<&str>) -> HeartbeatData {
        HeartbeatData {
            status: "active".to_string(),
            positions: 2,
            pending_orders: 1,
            last_signal: last_signal.map(str::to_string),
            account: 1,
            magic_number: 2,
        }
    }

    #[test]
    fn test_new_connection_is_online_without_registration() {
        let now = Utc::now();
        let conn = EaConnection::new(EaIdentifier::new(1, 2), 1, 2, now);

        assert_eq!(conn.connection_status, ConnectionStatus::Online);
        assert!(conn.name.is_none());
        assert!(conn.last_heartbeat.is_none());
        assert_eq!(conn.registered_at, now);
    }

    #[test]
    fn test_heartbeat_treats_empty_last_signal_as_none() {
        let mut conn = EaConnection::new(EaIdentifier::new(1, 2), 1, 2, Utc::now());

        conn.apply_heartbeat(heartbeat(Some("")), Utc::now());
        assert_eq!(conn.last_signal, None);

        conn.apply_heartbeat(heartbeat(Some("SIG_9")), Utc::now());
        assert_eq!(conn.last_signal.as_deref(), Some("SIG_9"));
        assert_eq!(conn.positions, 2);
        assert_eq!(conn.pending_orders, 1);
        assert!(conn.last_heartbeat.is_some());
    }

    #[test]
    fn test_any_update_restores_online() {
        let mut conn = EaConnection::new(EaIdentifier::new(1, 2), 1, 2, Utc::now());
        conn.connection_status = ConnectionStatus::Timeout;

        conn.apply_account_status(
            AccountStatusData {
                balance: 10000.0,
                equity: 10150.0,
                margin: 500.0,
                free_margin: 9650.0,
                margin_level: 2030.0,
                profit: 150.0,
                open_positions: 2,
                account: 1,
                magic_number: 2,
            },
            Utc::now(),
        );

        assert_eq!(conn.connection_status, ConnectionStatus::Online);
        assert_eq!(conn.account_status.as_ref().map(|a| a.equity), Some(10150.0));
    }
}
