use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

use crate::api::{create_router, AppState};
use crate::bootstrap::{services::ServiceRegistry, Application};
use crate::cert;
use crate::config::Config;
use crate::log_buffer::LogBuffer;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub async fn setup(
    config: Config,
    registry: ServiceRegistry,
    log_buffer: LogBuffer,
    log_guard: Option<WorkerGuard>,
) -> Result<Application> {
    let server_address = config.server_address();
    tracing::info!("Server will listen on: {}", server_address);

    let allowed_origins = config.allowed_origins();
    let cors_disabled = config.cors.disable;
    if cors_disabled {
        tracing::warn!("CORS is DISABLED in config - all origins will be allowed!");
    } else {
        tracing::info!("API state created with CORS origins: {:?}", allowed_origins);
    }

    let tls_config = if config.tls.enabled {
        Some(load_tls(&config).await?)
    } else {
        None
    };

    let app_state = AppState {
        bridge: registry.bridge,
        validator: registry.validator,
        log_buffer,
        allowed_origins,
        cors_disabled,
        config: Arc::new(config),
    };
    let router = create_router(app_state);

    let socket_addr: SocketAddr = server_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", server_address))?;

    Ok(Application {
        router,
        tls_config,
        bind_address: server_address,
        socket_addr,
        monitor: registry.monitor,
        log_guard,
    })
}

async fn load_tls(config: &Config) -> Result<RustlsConfig> {
    let base_path = std::env::current_dir()?;
    let paths = cert::ensure_certificate(&config.tls, &base_path)?;

    let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .context("Failed to load TLS certificate")?;
    tracing::info!("TLS configuration loaded successfully");
    Ok(tls_config)
}

/// Serve until Ctrl-C, then drain in-flight requests
pub async fn run(app: Application) -> Result<()> {
    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    let service = app.router.into_make_service();
    match app.tls_config {
        Some(tls_config) => {
            tracing::info!("HTTPS server listening on https://{}", app.bind_address);
            axum_server::bind_rustls(app.socket_addr, tls_config)
                .handle(handle)
                .serve(service)
                .await?;
        }
        None => {
            tracing::info!("HTTP server listening on http://{}", app.bind_address);
            axum_server::bind(app.socket_addr)
                .handle(handle)
                .serve(service)
                .await?;
        }
    }

    app.monitor.abort();
    tracing::info!("Server stopped");
    drop(app.log_guard);
    Ok(())
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
