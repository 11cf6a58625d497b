// Library interface for the EA signal bridge server
// Exposes modules for integration testing

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod bridge;
pub mod cert;
pub mod config;
pub mod connection_manager;
pub mod log_buffer;
pub mod logging;
pub mod models;
pub mod signal_queue;
pub mod trade_result_log;
