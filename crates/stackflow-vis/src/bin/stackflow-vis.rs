//! Stackflow canvas server
//!
//! Load the simulation scripts and serve the canvas frontend.

use stackflow_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stackflow=info,stackflow_vis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_env();
    tracing::info!(addr = %config.addr, tick = ?config.tick, speed = ?config.speed, "starting Stackflow canvas");

    let server = VisServer::from_config(config)?;
    server.serve().await?;

    Ok(())
}
