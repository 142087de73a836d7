//! 服务器主逻辑
//!
//! 共享状态（对局 + 座位表）放在一把锁后面。持锁期间只做校验、修改与
//! 入队（非阻塞 `try_send`）；真正的网络写入由每个连接的写任务
//! 在锁外完成。

use std::sync::Arc;
use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use protocol::{
    ClientMessage, Connection, GameError, LineReader, LineWriter, Listener, Position,
    ProtocolError, SeatId, ServerMessage, TcpConnection, TcpListener, MAX_SEATS,
    OUTBOUND_QUEUE_CAPACITY, READ_POLL_INTERVAL,
};

use crate::error::ServerError;
use crate::registry::{ConnectionId, SeatAssignment, SeatRegistry};
use crate::session::GameSession;

/// 服务器状态
pub struct ServerState {
    pub session: GameSession,
    pub seats: SeatRegistry,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            session: GameSession::new(),
            seats: SeatRegistry::new(),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// 共享状态句柄
pub type SharedState = Arc<Mutex<ServerState>>;

/// 待发送的消息
struct PendingMessages {
    messages: Vec<(SeatId, ServerMessage)>,
    broadcasts: Vec<ServerMessage>,
}

impl PendingMessages {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            broadcasts: Vec::new(),
        }
    }

    fn send(&mut self, seat_id: SeatId, msg: ServerMessage) {
        self.messages.push((seat_id, msg));
    }

    fn broadcast(&mut self, msg: ServerMessage) {
        self.broadcasts.push(msg);
    }

    /// 投递到各座位的发送队列。每个座位独立投递，
    /// 失败的座位按断线处理
    fn flush(self, state: &mut ServerState) {
        let mut failed: Vec<(SeatId, ConnectionId)> = Vec::new();

        for (seat_id, msg) in self.messages {
            if let Err(conn_id) = state.seats.deliver(seat_id, msg) {
                failed.push((seat_id, conn_id));
            }
        }

        for msg in self.broadcasts {
            let targets: Vec<SeatId> = state.seats.live_seats().map(|seat| seat.id).collect();
            for seat_id in targets {
                if let Err(conn_id) = state.seats.deliver(seat_id, msg.clone()) {
                    failed.push((seat_id, conn_id));
                }
            }
        }

        for (seat_id, conn_id) in failed {
            warn!(seat_id, conn_id, "outbound queue unavailable, dropping seat");
            MessageHandler::handle_disconnect(state, seat_id, conn_id);
        }
    }
}

/// 消息处理器
pub struct MessageHandler;

impl MessageHandler {
    /// 新连接入座：欢迎消息，然后开局广播或等待提示
    pub fn handle_join(
        state: &mut ServerState,
        sender: mpsc::Sender<ServerMessage>,
        peer_addr: Option<String>,
    ) -> Result<SeatAssignment, ServerError> {
        let seat = state.seats.register(sender, peer_addr)?;
        let mut pending = PendingMessages::new();

        pending.send(
            seat.seat_id,
            ServerMessage::Welcome {
                player_color: seat.color,
                client_id: seat.seat_id,
                message: format!("You are player {} ({})", seat.color.code(), seat.color),
            },
        );

        if state.seats.is_ready_to_start() {
            state.session.start();
            info!("both seats filled, new game started");
            pending.broadcast(ServerMessage::GameStart {
                game_state: state.session.snapshot(),
                message: "The game has started!".to_string(),
            });
        } else {
            let active = state.seats.active_seat_count();
            pending.send(
                seat.seat_id,
                ServerMessage::Waiting {
                    message: format!("Waiting for opponent... ({}/{} players)", active, MAX_SEATS),
                },
            );
        }

        pending.flush(state);
        Ok(seat)
    }

    /// 处理客户端消息。座位已失效时返回 false，读循环应退出
    pub fn handle(state: &mut ServerState, seat: SeatAssignment, msg: ClientMessage) -> bool {
        if !state.seats.is_live(seat.seat_id, seat.conn_id) {
            return false;
        }

        let mut pending = PendingMessages::new();
        match msg {
            ClientMessage::Move { row, col } => {
                Self::handle_move(state, &mut pending, seat, row, col);
            }
        }
        pending.flush(state);
        true
    }

    /// 处理落子
    fn handle_move(
        state: &mut ServerState,
        pending: &mut PendingMessages,
        seat: SeatAssignment,
        row: u8,
        col: u8,
    ) {
        let revision = state.session.revision();
        let result = match Position::new(row, col) {
            Some(pos) => state.session.attempt_move(pos, seat.color),
            None => Err(GameError::InvalidPosition { row, col }),
        };

        match result {
            Ok(applied) => {
                info!(
                    seat_id = seat.seat_id,
                    color = %seat.color,
                    position = %applied.position,
                    flipped = applied.flipped,
                    next = ?applied.next,
                    "move applied"
                );
                pending.send(
                    seat.seat_id,
                    ServerMessage::MoveResponse {
                        success: true,
                        message: "Move accepted".to_string(),
                    },
                );
                pending.broadcast(ServerMessage::GameUpdate {
                    game_state: state.session.snapshot(),
                });
            }
            Err(e) => {
                debug!(seat_id = seat.seat_id, row, col, "move rejected: {}", e);
                pending.send(
                    seat.seat_id,
                    ServerMessage::MoveResponse {
                        success: false,
                        message: e.to_string(),
                    },
                );
                // 拒绝时发生了回合结算（让步 / 终局），双方需要重新同步
                if state.session.revision() != revision {
                    pending.broadcast(ServerMessage::GameUpdate {
                        game_state: state.session.snapshot(),
                    });
                }
            }
        }
    }

    /// 处理玩家断线。重复调用或过期连接的调用不产生任何效果
    pub fn handle_disconnect(
        state: &mut ServerState,
        seat_id: SeatId,
        conn_id: ConnectionId,
    ) -> bool {
        let Some(color) = state.seats.mark_dead(seat_id, conn_id) else {
            return false;
        };
        let peer = state.seats.get(seat_id).and_then(|seat| seat.peer_addr.clone());
        info!(seat_id, conn_id, %color, peer = ?peer, "player disconnected");

        if state.session.abandon() {
            warn!("match abandoned, waiting for two players to start over");
        }

        let mut pending = PendingMessages::new();
        pending.broadcast(ServerMessage::OpponentDisconnected {
            message: "Your opponent has disconnected".to_string(),
        });
        pending.broadcast(ServerMessage::Waiting {
            message: format!(
                "Waiting for opponent... ({}/{} players)",
                state.seats.active_seat_count(),
                MAX_SEATS
            ),
        });
        pending.flush(state);
        true
    }
}

/// 游戏服务器（接受循环）
pub struct GameServer {
    listener: TcpListener,
    state: SharedState,
}

impl GameServer {
    /// 绑定监听地址，失败即终止启动
    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: Arc::new(Mutex::new(ServerState::new())),
        })
    }

    pub fn local_addr(&self) -> Option<String> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// 持续接受连接，直到收到停机信号
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(addr = ?self.local_addr(), "server listening");

        loop {
            tokio::select! {
                accepted = self.listener.accept_stream() => match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "new connection");
                        if let Err(e) = self.admit(stream, shutdown.clone()).await {
                            warn!(%peer, "connection setup failed: {}", e);
                        }
                    }
                    Err(e) => {
                        error!("accept failed: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
                _ = shutdown.changed() => {
                    info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }
    }

    /// 在接受循环内持锁入座，座位与颜色严格按接受顺序分配；
    /// 之后的读写（包括满员拒绝）交给独立任务
    async fn admit(
        &self,
        stream: TcpStream,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), ServerError> {
        let conn = TcpConnection::from_stream(stream)?;
        let peer_addr = conn.peer_addr();
        let (reader, writer) = conn.split();
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);

        let joined = {
            let mut guard = self.state.lock().await;
            MessageHandler::handle_join(&mut guard, tx, peer_addr.clone())
        };

        let state = self.state.clone();
        tokio::spawn(async move {
            let peer = peer_addr.clone();
            if let Err(e) =
                handle_connection(state, reader, writer, rx, joined, peer_addr, shutdown).await
            {
                warn!(?peer, "connection error: {}", e);
            }
        });
        Ok(())
    }
}

/// 单个连接的完整生命周期：写任务、读循环、断线清理。
/// 座位已在接受循环中分配
async fn handle_connection(
    state: SharedState,
    mut reader: LineReader<OwnedReadHalf>,
    mut writer: LineWriter<OwnedWriteHalf>,
    rx: mpsc::Receiver<ServerMessage>,
    joined: Result<SeatAssignment, ServerError>,
    peer_addr: Option<String>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let seat = match joined {
        Ok(seat) => seat,
        Err(ServerError::Capacity { max }) => {
            warn!(peer = ?peer_addr, "rejecting connection, all {} seats taken", max);
            writer
                .write_message(&ServerMessage::ServerFull {
                    message: format!("Server full: {} players already connected", max),
                })
                .await?;
            writer.shutdown().await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    info!(seat_id = seat.seat_id, color = %seat.color, peer = ?peer_addr, "player seated");

    let writer_task = tokio::spawn(write_loop(state.clone(), writer, rx, seat));
    read_loop(&state, &mut reader, seat, shutdown).await;

    {
        let mut guard = state.lock().await;
        MessageHandler::handle_disconnect(&mut guard, seat.seat_id, seat.conn_id);
    }

    if let Err(e) = writer_task.await {
        error!(seat_id = seat.seat_id, "writer task failed: {}", e);
    }
    Ok(())
}

/// 读循环：按行解码，坏行丢弃，连接关闭或座位失效时退出
async fn read_loop(
    state: &SharedState,
    reader: &mut LineReader<OwnedReadHalf>,
    seat: SeatAssignment,
    shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            debug!(seat_id = seat.seat_id, "shutdown, closing connection");
            break;
        }

        match timeout(READ_POLL_INTERVAL, reader.read_message::<ClientMessage>()).await {
            Err(_) => {
                if !state.lock().await.seats.is_live(seat.seat_id, seat.conn_id) {
                    break;
                }
            }
            Ok(Ok(msg)) => {
                debug!(seat_id = seat.seat_id, ?msg, "received");
                let mut guard = state.lock().await;
                if !MessageHandler::handle(&mut guard, seat, msg) {
                    break;
                }
            }
            Ok(Err(e)) if e.is_recoverable() => {
                warn!(seat_id = seat.seat_id, "dropping malformed line: {}", e);
            }
            Ok(Err(ProtocolError::ConnectionClosed)) => {
                info!(seat_id = seat.seat_id, "connection closed by peer");
                break;
            }
            Ok(Err(e)) => {
                warn!(seat_id = seat.seat_id, "read failed: {}", e);
                break;
            }
        }
    }
}

/// 写任务：排空发送队列。写失败即按断线处理；
/// 队列关闭（座位失效）后关闭写端
async fn write_loop(
    state: SharedState,
    mut writer: LineWriter<OwnedWriteHalf>,
    mut rx: mpsc::Receiver<ServerMessage>,
    seat: SeatAssignment,
) {
    while let Some(msg) = rx.recv().await {
        debug!(seat_id = seat.seat_id, kind = msg.kind(), "sending");
        if let Err(e) = writer.write_message(&msg).await {
            warn!(seat_id = seat.seat_id, "write failed: {}", e);
            let mut guard = state.lock().await;
            MessageHandler::handle_disconnect(&mut guard, seat.seat_id, seat.conn_id);
            return;
        }
    }
    let _ = writer.shutdown().await;
}
