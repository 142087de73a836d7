//! 黑白棋 AI
//!
//! 包含:
//! - 局面评估函数（位置权重 + 行动力 + 子数）
//! - Negamax + Alpha-Beta 搜索
//! - 自动对弈的协议客户端（带落子节流）

mod client;
mod evaluate;
mod search;

pub use client::{choose_move, turn_to_play, AiClient, Throttle};
pub use evaluate::{Evaluator, WEIGHTS, WIN_SCORE};
pub use search::{AiConfig, AiEngine, SearchResult};
