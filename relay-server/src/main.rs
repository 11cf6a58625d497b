use anyhow::Result;
use ea_signal_bridge::bootstrap;

#[tokio::main]
async fn main() -> Result<()> {
    // Bootstrap the application (config, logging, bridge state, API router)
    let app = bootstrap::setup().await?;

    bootstrap::server::run(app).await
}
