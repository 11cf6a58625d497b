use anyhow::{Context, Result};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;

pub mod logging;
pub mod server;
pub mod services;

pub struct Application {
    pub router: Router,
    /// `None` serves plain HTTP
    pub tls_config: Option<RustlsConfig>,
    pub bind_address: String,
    pub socket_addr: SocketAddr,
    pub monitor: JoinHandle<()>,
    pub log_guard: Option<WorkerGuard>,
}

pub async fn setup() -> Result<Application> {
    // Initialize rustls with ring crypto provider; a second install is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();

    // 1. Load Configuration
    let config = load_config();

    // 2. Setup Logging
    let (log_buffer, log_guard) = logging::setup(&config);

    // 3. Setup Services & Background Tasks
    let registry = services::setup(&config).context("Failed to set up services")?;

    // 4. Setup Server (API & TLS)
    server::setup(config, registry, log_buffer, log_guard).await
}

/// Config directory: `CONFIG_DIR`, else the executable's directory
fn load_config() -> Config {
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_string_lossy().into_owned()))
            .unwrap_or_else(|| ".".to_string())
    });
    let config_base = format!("{}/config", config_dir);

    eprintln!(
        "Config directory: {}, config base: {}",
        config_dir, config_base
    );

    match Config::from_file(&config_base) {
        Ok(cfg) => {
            eprintln!("Configuration loaded successfully from {}", config_base);
            cfg
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}, using defaults", e);
            Config::from_env().unwrap_or_else(|e| {
                eprintln!("Ignoring environment configuration: {:#}", e);
                let mut cfg = Config::default();
                cfg.apply_env_overrides();
                cfg
            })
        }
    }
}
