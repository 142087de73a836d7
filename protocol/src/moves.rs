//! 走法生成和验证
//!
//! 落子合法性：目标格为空，且沿 8 个方向中至少一个方向，
//! 紧邻一段连续的对方棋子，其后紧跟己方棋子（夹子）。

use crate::board::Board;
use crate::disc::{Cell, Outcome, Position, Side};
use crate::error::GameError;

/// 8 个方向 (dr, dc)
#[rustfmt::skip]
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// 一步棋之后的回合走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTurn {
    /// 正常轮到该方
    Play(Side),
    /// `skipped` 无棋可下，回合让给 `next`
    Pass { skipped: Side, next: Side },
    /// 双方都无棋可下
    GameOver(Outcome),
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 沿一个方向可被翻转的棋子；不构成夹子时为空
    pub fn flips_in_direction(
        board: &Board,
        pos: Position,
        side: Side,
        dr: i8,
        dc: i8,
    ) -> Vec<Position> {
        let opponent = side.opponent().to_cell();
        let own = side.to_cell();
        let mut run = Vec::new();
        let mut cursor = pos.offset(dr, dc);

        while let Some(p) = cursor {
            match board.get(p) {
                cell if cell == opponent => {
                    run.push(p);
                    cursor = p.offset(dr, dc);
                }
                cell if cell == own => return run,
                _ => break,
            }
        }

        Vec::new()
    }

    /// 在 `pos` 落子会翻转的全部棋子；目标格非空或越界时为空
    pub fn flips(board: &Board, pos: Position, side: Side) -> Vec<Position> {
        if !pos.is_valid() || !board.get(pos).is_empty() {
            return Vec::new();
        }

        DIRECTIONS
            .iter()
            .flat_map(|&(dr, dc)| Self::flips_in_direction(board, pos, side, dr, dc))
            .collect()
    }

    /// 检查落子是否合法
    pub fn is_legal(board: &Board, pos: Position, side: Side) -> bool {
        if !pos.is_valid() || !board.get(pos).is_empty() {
            return false;
        }

        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| !Self::flips_in_direction(board, pos, side, dr, dc).is_empty())
    }

    /// 生成指定阵营的所有合法落点（行优先顺序）
    pub fn legal_moves(board: &Board, side: Side) -> Vec<Position> {
        Position::all()
            .filter(|&pos| Self::is_legal(board, pos, side))
            .collect()
    }

    /// 指定阵营是否有棋可下
    pub fn has_legal_move(board: &Board, side: Side) -> bool {
        Position::all().any(|pos| Self::is_legal(board, pos, side))
    }

    /// 在棋盘上直接落子并翻转，返回翻转数
    pub fn apply_in_place(
        board: &mut Board,
        pos: Position,
        side: Side,
    ) -> Result<usize, GameError> {
        if !pos.is_valid() {
            return Err(GameError::InvalidPosition {
                row: pos.row,
                col: pos.col,
            });
        }

        let flipped = Self::flips(board, pos, side);
        if flipped.is_empty() {
            return Err(GameError::IllegalMove {
                row: pos.row,
                col: pos.col,
            });
        }

        let own = side.to_cell();
        board.set(pos, own);
        for p in &flipped {
            board.set(*p, own);
        }

        Ok(flipped.len())
    }

    /// 试走：返回落子后的新棋盘，原棋盘不变
    pub fn apply_move(board: &Board, pos: Position, side: Side) -> Result<Board, GameError> {
        let mut next = *board;
        Self::apply_in_place(&mut next, pos, side)?;
        Ok(next)
    }

    /// 双方都无棋可下即终局
    pub fn is_terminal(board: &Board) -> bool {
        !Self::has_legal_move(board, Side::Black) && !Self::has_legal_move(board, Side::White)
    }

    /// 名义上轮到 `to_move` 时，实际的回合走向
    pub fn settle_turn(board: &Board, to_move: Side) -> NextTurn {
        if Self::has_legal_move(board, to_move) {
            NextTurn::Play(to_move)
        } else if Self::has_legal_move(board, to_move.opponent()) {
            NextTurn::Pass {
                skipped: to_move,
                next: to_move.opponent(),
            }
        } else {
            NextTurn::GameOver(board.scores().outcome())
        }
    }

    /// `mover` 刚落子之后的回合走向
    pub fn next_turn(board: &Board, mover: Side) -> NextTurn {
        Self::settle_turn(board, mover.opponent())
    }
}
