//! 自动对弈客户端
//!
//! 收到 `game_start` / `game_update` 且轮到自己时搜索并提交走法。
//! 提交前用服务端给出的合法步列表校验，
//! 搜索结果不在其中时随机挑一个合法步。

use std::time::Duration;

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use protocol::{
    ClientMessage, Connection, GameSnapshot, Position, ProtocolError, ServerMessage, Side,
};

use crate::search::{AiConfig, AiEngine};

/// 落子节流：两次提交之间至少间隔 `min_interval`
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// 距离下一次允许提交还需等待的时间
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => (last + self.min_interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// 记录一次提交
    pub fn record(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// 等到允许提交为止
    pub async fn wait(&self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            debug!(wait_ms = remaining.as_millis() as u64, "throttling move submission");
            sleep(remaining).await;
        }
    }
}

/// 校验搜索结果；不在合法步列表中时随机选择一个合法步
pub fn choose_move<R: Rng + ?Sized>(
    candidate: Option<Position>,
    snapshot: &GameSnapshot,
    rng: &mut R,
) -> Option<Position> {
    match candidate {
        Some(pos) if snapshot.is_valid_move(pos) => Some(pos),
        _ => {
            let fallback = snapshot.valid_moves.choose(rng).copied();
            warn!(?candidate, ?fallback, "search result not in valid moves, using fallback");
            fallback
        }
    }
}

/// 轮到 `color` 且有棋可下时返回该颜色
pub fn turn_to_play(color: Option<Side>, snapshot: &GameSnapshot) -> Option<Side> {
    let color = color?;
    if snapshot.game_over || snapshot.current_player != color || snapshot.valid_moves.is_empty() {
        return None;
    }
    Some(color)
}

/// AI 客户端
pub struct AiClient<C: Connection> {
    conn: C,
    config: AiConfig,
    color: Option<Side>,
    throttle: Throttle,
}

impl<C: Connection> AiClient<C> {
    pub fn new(conn: C, config: AiConfig) -> Self {
        let throttle = Throttle::new(config.move_interval());
        Self {
            conn,
            config,
            color: None,
            throttle,
        }
    }

    /// 服务端分配的颜色
    pub fn color(&self) -> Option<Side> {
        self.color
    }

    /// 主循环，直到服务端关闭连接
    pub async fn run(mut self) -> Result<()> {
        loop {
            let msg = match self.conn.recv::<ServerMessage>().await {
                Ok(msg) => msg,
                Err(e) if e.is_recoverable() => {
                    warn!("dropping malformed line: {}", e);
                    continue;
                }
                Err(ProtocolError::ConnectionClosed) => {
                    info!("server closed the connection");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if !self.handle_message(msg).await? {
                let _ = self.conn.close().await;
                return Ok(());
            }
        }
    }

    /// 处理一条服务端消息。返回 false 表示应结束
    async fn handle_message(&mut self, msg: ServerMessage) -> Result<bool> {
        debug!(kind = msg.kind(), "received");
        match msg {
            ServerMessage::Welcome {
                player_color,
                client_id,
                message,
            } => {
                info!(%player_color, client_id, "{}", message);
                self.color = Some(player_color);
            }
            ServerMessage::Waiting { message } => info!("{}", message),
            ServerMessage::GameStart { game_state, message } => {
                info!("{}", message);
                self.take_turn(&game_state).await?;
            }
            ServerMessage::GameUpdate { game_state } => {
                if game_state.game_over {
                    info!(winner = ?game_state.winner, scores = ?game_state.scores, "game over");
                }
                self.take_turn(&game_state).await?;
            }
            ServerMessage::MoveResponse { success, message } => {
                if !success {
                    warn!("move rejected: {}", message);
                }
            }
            ServerMessage::OpponentDisconnected { message } => warn!("{}", message),
            ServerMessage::ServerFull { message } => {
                error!("{}", message);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 轮到自己时搜索并提交走法
    async fn take_turn(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        let Some(side) = turn_to_play(self.color, snapshot) else {
            return Ok(());
        };

        self.throttle.wait().await;

        let board = snapshot.board;
        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || {
            AiEngine::new(config).search_with_stats(&board, side)
        })
        .await?;

        if let Some(result) = &result {
            info!(
                nodes = result.nodes,
                elapsed_ms = result.elapsed.as_millis() as u64,
                score = result.score,
                best = %result.best_move,
                "search finished"
            );
        }

        let chosen = choose_move(
            result.map(|r| r.best_move),
            snapshot,
            &mut rand::thread_rng(),
        );
        if let Some(pos) = chosen {
            info!(%side, position = %pos, "submitting move");
            self.conn.send(&ClientMessage::from_position(pos)).await?;
            self.throttle.record(Instant::now());
        }
        Ok(())
    }
}
