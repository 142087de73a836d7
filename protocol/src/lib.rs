//! 黑白棋共享协议库
//!
//! 包含:
//! - 棋盘、棋子、位置等核心数据结构
//! - 走法生成、落子翻转、回合与终局判定
//! - 消息类型定义 (ClientMessage, ServerMessage)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 行分隔 JSON 编解码
//! - 网络配置

mod board;
mod config;
mod constants;
mod disc;
mod error;
mod message;
mod moves;
mod transport;

pub use board::{Board, GameSnapshot, Scores};
pub use config::NetworkConfig;
pub use constants::*;
pub use disc::{Cell, Outcome, Position, Side};
pub use error::{GameError, ProtocolError, Result};
pub use message::{ClientMessage, SeatId, ServerMessage};
pub use moves::{MoveGenerator, NextTurn, DIRECTIONS};
pub use transport::{
    decode_line, encode_line, Connection, Connector, LineReader, LineWriter, Listener,
    TcpConnection, TcpConnector, TcpListener,
};
