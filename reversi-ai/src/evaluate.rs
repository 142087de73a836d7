//! 局面评估函数
//!
//! 分值统一放大 10 倍以便使用整数：
//! 位置分 ×8，行动力满分 ±200，子数差 ×1。

use protocol::{Board, MoveGenerator, Position, Side, BOARD_SIZE};

/// 位置权重表：角最高，紧邻角的格子为负
#[rustfmt::skip]
pub const WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [100, -20,  10,   5,   5,  10, -20, 100],
    [-20, -50,  -2,  -2,  -2,  -2, -50, -20],
    [ 10,  -2,  -1,  -1,  -1,  -1,  -2,  10],
    [  5,  -2,  -1,   0,   0,  -1,  -2,   5],
    [  5,  -2,  -1,   0,   0,  -1,  -2,   5],
    [ 10,  -2,  -1,  -1,  -1,  -1,  -2,  10],
    [-20, -50,  -2,  -2,  -2,  -2, -50, -20],
    [100, -20,  10,   5,   5,  10, -20, 100],
];

/// 终局胜负的基础分，远大于任何静态评估
pub const WIN_SCORE: i32 = 100_000;

const POSITIONAL_SCALE: i32 = 8;
const MOBILITY_SCALE: i32 = 200;
const DISC_SCALE: i32 = 1;

/// 评估器
pub struct Evaluator;

impl Evaluator {
    /// 评估局面（`side` 视角，正值对 `side` 有利）
    pub fn evaluate(board: &Board, side: Side) -> i32 {
        Self::positional(board, side) * POSITIONAL_SCALE
            + Self::mobility(board, side)
            + Self::disc_difference(board, side) * DISC_SCALE
    }

    /// 位置分：己方棋子权重之和减去对方
    pub fn positional(board: &Board, side: Side) -> i32 {
        Position::all()
            .map(|pos| {
                let weight = WEIGHTS[pos.row as usize][pos.col as usize];
                match board.get(pos).side() {
                    Some(owner) if owner == side => weight,
                    Some(_) => -weight,
                    None => 0,
                }
            })
            .sum()
    }

    /// 行动力：`200·(p−o)/(p+o)`，双方都无棋可下时为 0
    pub fn mobility(board: &Board, side: Side) -> i32 {
        let mine = MoveGenerator::legal_moves(board, side).len() as i32;
        let theirs = MoveGenerator::legal_moves(board, side.opponent()).len() as i32;
        if mine + theirs == 0 {
            0
        } else {
            MOBILITY_SCALE * (mine - theirs) / (mine + theirs)
        }
    }

    /// 子数差
    pub fn disc_difference(board: &Board, side: Side) -> i32 {
        board.count(side) as i32 - board.count(side.opponent()) as i32
    }

    /// 终局评估：胜 `WIN_SCORE + 子数差`，负 `-WIN_SCORE + 子数差`，平局 0
    pub fn terminal(board: &Board, side: Side) -> i32 {
        let diff = Self::disc_difference(board, side);
        match diff.signum() {
            1 => WIN_SCORE + diff,
            -1 => -WIN_SCORE + diff,
            _ => 0,
        }
    }
}
