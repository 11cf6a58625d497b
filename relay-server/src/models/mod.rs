mod connection;
mod status;
mod trade_result;

pub use connection::*;
pub use status::*;
pub use trade_result::*;

// Re-export shared wire types
pub use ea_bridge_protocol::{
    AccountStatusData, EaEnvelope, EaIdentifier, EaInfoData, EaMessage, HeartbeatData,
    MessageKind, PendingSignal, SignalPoll, SignalRequest, TradeResultData,
};
