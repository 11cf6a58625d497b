// Location: mt-bridge/src/lib.rs
// Purpose: Wire protocol shared by the signal bridge server and EA clients
// Why: Server handlers and EA simulators decode exactly the same message shapes

pub mod constants;
pub mod errors;
pub mod identity;
pub mod types;

#[cfg(test)]
mod tests;

pub use constants::{
    API_KEY_HEADER, MSG_TYPE_ACCOUNT_STATUS, MSG_TYPE_EA_INFO, MSG_TYPE_HEARTBEAT,
    MSG_TYPE_NO_SIGNAL, MSG_TYPE_SIGNAL, MSG_TYPE_TRADE_RESULT, RESPONSE_STATUS_OK,
    RESPONSE_STATUS_SUCCESS,
};
pub use errors::ProtocolError;
pub use identity::EaIdentifier;
pub use types::{
    AccountStatusData, AckResponse, EaAckResponse, EaEnvelope, EaInfoData, EaMessage,
    HeartbeatData, MessageKind, PendingSignal, SignalAcceptedResponse, SignalPoll,
    SignalRequest, TradeResultData,
};
