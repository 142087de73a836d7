use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::{Connector, NetworkConfig, TcpConnector};
use reversi_ai::{AiClient, AiConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("reversi_ai=debug".parse()?))
        .init();

    println!("=== Reversi AI Client ===");
    let network = tokio::task::spawn_blocking(|| {
        NetworkConfig::prompt(NetworkConfig::client_default())
    })
    .await??;
    let addr = network.addr();

    let conn = TcpConnector
        .connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;
    let config = AiConfig::default();
    info!(%addr, depth = config.max_depth, "connected, AI ready");

    tokio::select! {
        result = AiClient::new(conn, config).run() => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }
    Ok(())
}
