//! 错误类型定义

use thiserror::Error;

use crate::disc::Side;

/// 黑白棋规则错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// 坐标超出棋盘
    #[error("Invalid position: ({row}, {col})")]
    InvalidPosition { row: u8, col: u8 },

    /// 目标格非空或不能夹住对方棋子
    #[error("Illegal move: ({row}, {col})")]
    IllegalMove { row: u8, col: u8 },

    /// 不是你的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 当前走子方无棋可下，回合已让给对方
    #[error("{skipped} has no legal move, turn passes to {next}")]
    TurnPassed { skipped: Side, next: Side },

    /// 对局未在进行中
    #[error("Game is not in progress")]
    GameNotInProgress,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 编解码错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 行内容不是合法 UTF-8
    #[error("Invalid UTF-8 in line: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// 行超长
    #[error("Line too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 规则错误
    #[error("Game error: {0}")]
    Game(#[from] GameError),
}

impl ProtocolError {
    /// 单行解码失败：丢弃该行，连接继续可用
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::Json(_) | ProtocolError::InvalidUtf8(_))
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
