use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::NetworkConfig;
use reversi_server::GameServer;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("reversi_server=debug".parse()?))
        .init();

    println!("=== Reversi Server ===");
    let config = tokio::task::spawn_blocking(|| {
        NetworkConfig::prompt(NetworkConfig::server_default())
    })
    .await??;
    let addr = config.addr();

    let server = GameServer::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "黑白棋服务端启动");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            // 保持发送端存活，否则接受循环会立即退出
            std::future::pending::<()>().await;
        }
        info!("interrupt received, shutting down");
        let _ = shutdown_tx.send(true);
    });

    server.run(shutdown_rx).await;
    info!("server stopped");
    Ok(())
}
