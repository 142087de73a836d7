//! 消息类型定义
//!
//! 每个方向一个封闭的带标签枚举，线上为单行 JSON，`type` 字段为判别式。
//! 未知的 `type` 或字段值越界在解码时即失败。

use serde::{Deserialize, Serialize};

use crate::board::GameSnapshot;
use crate::disc::{Position, Side};

/// 座位 ID（即 `client_id`）
pub type SeatId = usize;

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// 落子
    Move { row: u8, col: u8 },
}

impl ClientMessage {
    /// 从位置构造落子消息
    pub fn from_position(pos: Position) -> Self {
        ClientMessage::Move {
            row: pos.row,
            col: pos.col,
        }
    }
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// 入座成功，分配颜色
    Welcome {
        player_color: Side,
        client_id: SeatId,
        message: String,
    },
    /// 等待对手
    Waiting { message: String },
    /// 对局开始（广播）
    GameStart {
        game_state: GameSnapshot,
        message: String,
    },
    /// 落子后的完整状态（广播）
    GameUpdate { game_state: GameSnapshot },
    /// 落子结果（仅发给请求方）
    MoveResponse { success: bool, message: String },
    /// 对手断线（广播给剩余玩家）
    OpponentDisconnected { message: String },
    /// 座位已满，连接将被关闭
    ServerFull { message: String },
}

impl ServerMessage {
    /// 消息类型名（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Welcome { .. } => "welcome",
            ServerMessage::Waiting { .. } => "waiting",
            ServerMessage::GameStart { .. } => "game_start",
            ServerMessage::GameUpdate { .. } => "game_update",
            ServerMessage::MoveResponse { .. } => "move_response",
            ServerMessage::OpponentDisconnected { .. } => "opponent_disconnected",
            ServerMessage::ServerFull { .. } => "server_full",
        }
    }

    /// 消息中携带的对局快照
    pub fn game_state(&self) -> Option<&GameSnapshot> {
        match self {
            ServerMessage::GameStart { game_state, .. }
            | ServerMessage::GameUpdate { game_state } => Some(game_state),
            _ => None,
        }
    }
}
