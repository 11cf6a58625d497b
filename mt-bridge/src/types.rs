// Location: mt-bridge/src/types.rs
// Purpose: Type definitions for JSON messages exchanged between EAs and the signal bridge
// Why: Centralized definitions for the tagged EA envelope, signal payloads and acknowledgements

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    MSG_TYPE_ACCOUNT_STATUS, MSG_TYPE_EA_INFO, MSG_TYPE_HEARTBEAT, MSG_TYPE_TRADE_RESULT,
    RESPONSE_STATUS_SUCCESS,
};
use crate::errors::ProtocolError;
use crate::identity::EaIdentifier;

// =============================================================================
// EA -> bridge payloads
// =============================================================================

/// Registration payload sent once on EA start (and again after terminal restarts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EaInfoData {
    pub name: String,
    pub version: String,
    pub account: i64,
    pub broker: String,
    pub symbol: String,
    pub timeframe: String,
    pub magic_number: u64,
}

impl EaInfoData {
    pub fn ea_id(&self) -> EaIdentifier {
        EaIdentifier::new(self.account, self.magic_number)
    }
}

/// Heartbeat payload sent on every EA timer tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatData {
    pub status: String,
    pub positions: i32,
    pub pending_orders: i32,
    /// Reference to the last signal the EA processed (empty before the first one)
    #[serde(default)]
    pub last_signal: Option<String>,
    pub account: i64,
    pub magic_number: u64,
}

impl HeartbeatData {
    pub fn ea_id(&self) -> EaIdentifier {
        EaIdentifier::new(self.account, self.magic_number)
    }
}

/// Account balance and margin report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStatusData {
    pub balance: f64,
    pub equity: f64,
    pub margin: f64,
    pub free_margin: f64,
    pub margin_level: f64,
    pub profit: f64,
    pub open_positions: i32,
    pub account: i64,
    pub magic_number: u64,
}

impl AccountStatusData {
    pub fn ea_id(&self) -> EaIdentifier {
        EaIdentifier::new(self.account, self.magic_number)
    }
}

/// Execution outcome reported by the EA after attempting a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResultData {
    pub signal_id: String,
    /// Broker ticket, 0 when the order was rejected
    #[serde(default)]
    pub ticket: i64,
    pub success: bool,
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub execution_price: f64,
    #[serde(default)]
    pub slippage: f64,
}

// =============================================================================
// Envelope
// =============================================================================

/// Discriminator of an [`EaMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    EaInfo,
    Heartbeat,
    AccountStatus,
    TradeResult,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::EaInfo => MSG_TYPE_EA_INFO,
            MessageKind::Heartbeat => MSG_TYPE_HEARTBEAT,
            MessageKind::AccountStatus => MSG_TYPE_ACCOUNT_STATUS,
            MessageKind::TradeResult => MSG_TYPE_TRADE_RESULT,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of messages an EA can post, tagged by `type` with the payload under `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EaMessage {
    #[serde(rename = "EA_INFO")]
    EaInfo(EaInfoData),
    #[serde(rename = "HEARTBEAT")]
    Heartbeat(HeartbeatData),
    #[serde(rename = "ACCOUNT_STATUS")]
    AccountStatus(AccountStatusData),
    #[serde(rename = "TRADE_RESULT")]
    TradeResult(TradeResultData),
}

impl EaMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            EaMessage::EaInfo(_) => MessageKind::EaInfo,
            EaMessage::Heartbeat(_) => MessageKind::Heartbeat,
            EaMessage::AccountStatus(_) => MessageKind::AccountStatus,
            EaMessage::TradeResult(_) => MessageKind::TradeResult,
        }
    }

    /// Identifier of the reporting EA; trade results carry no account/magic pair
    pub fn ea_id(&self) -> Option<EaIdentifier> {
        match self {
            EaMessage::EaInfo(data) => Some(data.ea_id()),
            EaMessage::Heartbeat(data) => Some(data.ea_id()),
            EaMessage::AccountStatus(data) => Some(data.ea_id()),
            EaMessage::TradeResult(_) => None,
        }
    }
}

/// Full inbound message: `{ "type": ..., "data": {...}, "timestamp": "..." }`
#[derive(Debug, Clone, PartialEq)]
pub struct EaEnvelope {
    pub message: EaMessage,
    /// EA-side send time as reported by the terminal (not parsed, terminals format it differently)
    pub timestamp: String,
}

impl EaEnvelope {
    pub fn new(message: EaMessage) -> Self {
        Self {
            message,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Unwrap the message, rejecting envelopes posted to the wrong endpoint
    pub fn expect_kind(self, expected: MessageKind) -> Result<EaMessage, ProtocolError> {
        let found = self.message.kind();
        if found == expected {
            Ok(self.message)
        } else {
            Err(ProtocolError::UnexpectedMessageType { expected, found })
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Serialize for EaEnvelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", self.message.kind().as_str())?;
        match &self.message {
            EaMessage::EaInfo(data) => map.serialize_entry("data", data)?,
            EaMessage::Heartbeat(data) => map.serialize_entry("data", data)?,
            EaMessage::AccountStatus(data) => map.serialize_entry("data", data)?,
            EaMessage::TradeResult(data) => map.serialize_entry("data", data)?,
        }
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for EaEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        let Some(object) = value.as_object_mut() else {
            return Err(de::Error::custom("expected a message envelope object"));
        };

        let timestamp = match object.remove("timestamp") {
            Some(serde_json::Value::String(ts)) => ts,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "invalid type for `timestamp`: expected a string, found {}",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("timestamp")),
        };

        let message = EaMessage::deserialize(value).map_err(de::Error::custom)?;

        Ok(Self { message, timestamp })
    }
}

// =============================================================================
// Signals (producer -> bridge -> EA)
// =============================================================================

/// Body of `POST /send_signal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRequest {
    pub signal_id: String,
    pub instrument: String,
    pub action: String,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

impl SignalRequest {
    /// Field-level checks the JSON shape cannot express
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for (field, value) in [
            ("signal_id", &self.signal_id),
            ("instrument", &self.instrument),
            ("action", &self.action),
        ] {
            if value.trim().is_empty() {
                return Err(ProtocolError::invalid_field(field, "must not be blank"));
            }
        }

        if !self.volume.is_finite() || self.volume <= 0.0 {
            return Err(ProtocolError::invalid_field(
                "volume",
                format!("must be a positive number, got {}", self.volume),
            ));
        }

        for (field, value) in [("stop_loss", self.stop_loss), ("take_profit", self.take_profit)] {
            if matches!(value, Some(v) if !v.is_finite()) {
                return Err(ProtocolError::invalid_field(field, "must be a finite number"));
            }
        }

        Ok(())
    }

    /// Stamp the request with its submission time
    pub fn into_pending(self, submitted_at: DateTime<Utc>) -> PendingSignal {
        PendingSignal {
            signal_id: self.signal_id,
            instrument: self.instrument,
            action: self.action,
            volume: self.volume,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            submitted_at,
        }
    }
}

/// A queued signal as handed to the polling EA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSignal {
    pub signal_id: String,
    pub instrument: String,
    pub action: String,
    pub volume: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

/// Response of `GET /get_signal`: `{type:"SIGNAL", data:{...}}` or `{type:"NO_SIGNAL"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SignalPoll {
    #[serde(rename = "SIGNAL")]
    Signal(PendingSignal),
    #[serde(rename = "NO_SIGNAL")]
    NoSignal,
}

impl From<Option<PendingSignal>> for SignalPoll {
    fn from(signal: Option<PendingSignal>) -> Self {
        match signal {
            Some(signal) => SignalPoll::Signal(signal),
            None => SignalPoll::NoSignal,
        }
    }
}

// =============================================================================
// Acknowledgements
// =============================================================================

/// `{status:"success"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn success() -> Self {
        Self {
            status: RESPONSE_STATUS_SUCCESS.to_string(),
        }
    }
}

/// `{status:"success", ea_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EaAckResponse {
    pub status: String,
    pub ea_id: EaIdentifier,
}

impl EaAckResponse {
    pub fn success(ea_id: EaIdentifier) -> Self {
        Self {
            status: RESPONSE_STATUS_SUCCESS.to_string(),
            ea_id,
        }
    }
}

/// `{status:"success", signal_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAcceptedResponse {
    pub status: String,
    pub signal_id: String,
}

impl SignalAcceptedResponse {
    pub fn success(signal_id: impl Into<String>) -> Self {
        Self {
            status: RESPONSE_STATUS_SUCCESS.to_string(),
            signal_id: signal_id.into(),
        }
    }
}
