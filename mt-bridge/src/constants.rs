// Location: mt-bridge/src/constants.rs
// Purpose: Shared constants between the signal bridge and MQL EAs
// Why: Single source of truth for header names and message discriminators
//
// NOTE: The MQL side hardcodes these strings in its WebRequest calls. Keep both in sync.

// =============================================================================
// HTTP Constants
// =============================================================================

/// Header carrying the EA API key on every protected endpoint
pub const API_KEY_HEADER: &str = "X-API-Key";

/// `status` value returned by mutating endpoints
pub const RESPONSE_STATUS_SUCCESS: &str = "success";

/// `status` value returned by the liveness probe
pub const RESPONSE_STATUS_OK: &str = "ok";

// =============================================================================
// Message Type Constants (EA -> bridge)
// =============================================================================

/// EA registration (name, version, broker, symbol, timeframe)
pub const MSG_TYPE_EA_INFO: &str = "EA_INFO";

/// Periodic liveness report with position counts
pub const MSG_TYPE_HEARTBEAT: &str = "HEARTBEAT";

/// Balance / equity / margin report
pub const MSG_TYPE_ACCOUNT_STATUS: &str = "ACCOUNT_STATUS";

/// Execution outcome of a previously delivered signal
pub const MSG_TYPE_TRADE_RESULT: &str = "TRADE_RESULT";

// =============================================================================
// Message Type Constants (bridge -> EA)
// =============================================================================

/// A pending signal was dequeued for the polling EA
pub const MSG_TYPE_SIGNAL: &str = "SIGNAL";

/// The signal queue was empty
pub const MSG_TYPE_NO_SIGNAL: &str = "NO_SIGNAL";
