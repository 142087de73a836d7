use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::{
    Connector, LineReader, NetworkConfig, ProtocolError, ServerMessage, TcpConnector,
};
use reversi_ai::AiConfig;
use reversi_client::input::HELP;
use reversi_client::{
    parse_command, render_board, render_status, ClientEvent, ClientGame, Command, InputError,
};

/// 提示搜索深度（比对弈 AI 浅，保证即时响应）
const HINT_DEPTH: u8 = 4;

#[tokio::main]
async fn main() -> Result<()> {
    // 日志输出到 stderr，避免和棋盘混在一起
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("reversi_client=info".parse()?))
        .init();

    println!("=== Reversi ===");
    let network = tokio::task::spawn_blocking(|| {
        NetworkConfig::prompt(NetworkConfig::client_default())
    })
    .await??;
    let addr = network.addr();

    println!("Connecting to {} ...", addr);
    let conn = TcpConnector
        .connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;
    println!("Connected. Type `help` for commands.");

    let (reader, mut writer) = conn.split();
    let game = Arc::new(Mutex::new(ClientGame::new()));
    let mut receiver = tokio::spawn(receive_loop(reader, game.clone()));
    let mut lines = spawn_stdin_reader();

    loop {
        tokio::select! {
            _ = &mut receiver => break,
            line = lines.recv() => {
                let Some(line) = line else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", HELP),
                    Ok(Command::Board) => print_game(&*game.lock().await),
                    Ok(Command::Hint) => {
                        let current = game.lock().await.clone();
                        let hint = tokio::task::spawn_blocking(move || {
                            current.hint(AiConfig { max_depth: HINT_DEPTH, ..AiConfig::default() })
                        })
                        .await?;
                        match hint {
                            Some(pos) => println!("Hint: {} {}", pos.row, pos.col),
                            None => println!("No hint available, it is not your turn."),
                        }
                    }
                    Ok(Command::Move(pos)) => {
                        let prepared = game.lock().await.prepare_move(pos);
                        match prepared {
                            Ok(msg) => writer
                                .write_message(&msg)
                                .await
                                .context("failed to send move")?,
                            Err(e) => println!("{}", e),
                        }
                    }
                    Err(InputError::Empty) => {}
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    let _ = writer.shutdown().await;
    receiver.abort();
    println!("Bye.");
    Ok(())
}

/// 接收服务端消息并刷新显示，连接关闭或被拒绝时结束
async fn receive_loop(mut reader: LineReader<OwnedReadHalf>, game: Arc<Mutex<ClientGame>>) {
    loop {
        let msg = match reader.read_message::<ServerMessage>().await {
            Ok(msg) => msg,
            Err(e) if e.is_recoverable() => {
                warn!("dropping malformed line: {}", e);
                continue;
            }
            Err(ProtocolError::ConnectionClosed) => {
                println!("Server closed the connection.");
                return;
            }
            Err(e) => {
                println!("Connection lost: {}", e);
                return;
            }
        };
        debug!(kind = msg.kind(), "received");

        let mut game = game.lock().await;
        for event in game.apply(msg) {
            match event {
                ClientEvent::Notice(text) => println!("{}", text),
                ClientEvent::BoardChanged => print_game(&game),
                ClientEvent::Rejected(text) => println!("Move rejected: {}", text),
                ClientEvent::Refused(text) => {
                    println!("{}", text);
                    return;
                }
            }
        }
    }
}

fn print_game(game: &ClientGame) {
    if let Some(state) = &game.game_state {
        println!();
        print!("{}", render_board(state, game.player_color));
        println!("{}", render_status(state, game.player_color));
    }
}

/// 标准输入放在独立线程上读取，进程退出时不必等待它
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}
