// e2e-tests/src/lib.rs
//
// EA and signal-producer simulators for end-to-end testing over HTTP.

pub mod producer;
pub mod sandbox;
pub mod simulator;

pub use crate::producer::SignalProducer;
pub use crate::sandbox::TestSandbox;
pub use crate::simulator::{EaSimulator, ExecutionOutcome};

/// API key every sandbox accepts
pub const SANDBOX_API_KEY: &str = "sandbox-api-key";
