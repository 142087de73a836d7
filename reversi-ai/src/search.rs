//! 搜索引擎
//!
//! 固定深度的 Negamax + Alpha-Beta 剪枝。无棋可下时让步（消耗一层深度），
//! 双方都无棋时按终局计分。
//! 同分时保留枚举顺序（行优先）中靠前的走法。

use std::time::{Duration, Instant};

use protocol::{Board, MoveGenerator, Position, Side, AI_MOVE_INTERVAL_MS, AI_SEARCH_DEPTH};
use serde::{Deserialize, Serialize};

use crate::evaluate::Evaluator;

const INFINITY: i32 = 1_000_000_000;

/// AI 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    /// 搜索深度（层）
    pub max_depth: u8,
    /// 两次落子之间的最小间隔（毫秒）
    pub move_interval_ms: u64,
}

impl AiConfig {
    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_interval_ms)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            max_depth: AI_SEARCH_DEPTH,
            move_interval_ms: AI_MOVE_INTERVAL_MS,
        }
    }
}

/// 一次搜索的结果与统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Position,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// AI 引擎
pub struct AiEngine {
    config: AiConfig,
    nodes_searched: u64,
}

impl AiEngine {
    /// 创建新的 AI 引擎
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            nodes_searched: 0,
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 上一次搜索访问的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// 搜索最佳走法，无棋可下时返回 None
    pub fn search(&mut self, board: &Board, side: Side) -> Option<Position> {
        self.search_with_stats(board, side).map(|result| result.best_move)
    }

    /// 搜索最佳走法并返回分值与统计
    pub fn search_with_stats(&mut self, board: &Board, side: Side) -> Option<SearchResult> {
        self.nodes_searched = 0;
        let start = Instant::now();

        let moves = MoveGenerator::legal_moves(board, side);
        let mut best_move = *moves.first()?;
        let mut best_score = -INFINITY;
        let mut alpha = -INFINITY;
        let depth = self.config.max_depth.max(1);

        for mv in moves {
            let Ok(child) = MoveGenerator::apply_move(board, mv, side) else {
                continue;
            };
            let score = -self.negamax(&child, depth - 1, -INFINITY, -alpha, side.opponent());

            // 严格大于：同分保留先枚举到的走法
            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            alpha = alpha.max(score);
        }

        Some(SearchResult {
            best_move,
            score: best_score,
            nodes: self.nodes_searched,
            elapsed: start.elapsed(),
        })
    }

    /// Negamax（`to_move` 视角）
    fn negamax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        to_move: Side,
    ) -> i32 {
        self.nodes_searched += 1;

        if MoveGenerator::is_terminal(board) {
            return Evaluator::terminal(board, to_move);
        }
        if depth == 0 {
            return Evaluator::evaluate(board, to_move);
        }

        let moves = MoveGenerator::legal_moves(board, to_move);
        if moves.is_empty() {
            // 让步
            return -self.negamax(board, depth - 1, -beta, -alpha, to_move.opponent());
        }

        for mv in moves {
            let Ok(child) = MoveGenerator::apply_move(board, mv, to_move) else {
                continue;
            };
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, to_move.opponent());

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}
