//! 黑白棋服务端
//!
//! 包含:
//! - 对局控制
//! - 座位管理
//! - 连接处理与消息广播

pub mod error;
pub mod registry;
pub mod server;
pub mod session;

pub use error::ServerError;
pub use registry::{ConnectionId, Seat, SeatAssignment, SeatRegistry};
pub use server::{GameServer, MessageHandler, ServerState, SharedState};
pub use session::{GameSession, MoveApplied, SessionPhase};
