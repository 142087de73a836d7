//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::disc::{Cell, Outcome, Position, Side};
use crate::moves::MoveGenerator;

/// 棋盘
///
/// 8x8 格子，线上编码为二维数组 `[[0|1|2; 8]; 8]`。`Copy` 语义：
/// 试走（搜索、预览）直接复制，不会修改对局中的棋盘。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// 创建初始棋盘
    ///
    /// (3,3)、(4,4) 为白，(3,4)、(4,3) 为黑
    pub fn initial() -> Self {
        let mut board = Self::empty();
        let mid = (BOARD_SIZE / 2) as u8;
        board.set(Position::new_unchecked(mid - 1, mid - 1), Cell::White);
        board.set(Position::new_unchecked(mid, mid), Cell::White);
        board.set(Position::new_unchecked(mid - 1, mid), Cell::Black);
        board.set(Position::new_unchecked(mid, mid - 1), Cell::Black);
        board
    }

    /// 从二维数组创建
    pub fn from_cells(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// 获取指定位置的格子，越界视为空
    pub fn get(&self, pos: Position) -> Cell {
        if pos.is_valid() {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            Cell::Empty
        }
    }

    /// 设置指定位置的格子
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if pos.is_valid() {
            self.cells[pos.row as usize][pos.col as usize] = cell;
        }
    }

    /// 按行访问
    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// 指定阵营的棋子数
    pub fn count(&self, side: Side) -> u32 {
        let target = side.to_cell();
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == target)
            .count() as u32
    }

    /// 双方棋子计数
    pub fn scores(&self) -> Scores {
        Scores {
            black: self.count(Side::Black),
            white: self.count(Side::White),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

/// 双方子数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub black: u32,
    pub white: u32,
}

impl Scores {
    /// 按子数判定胜负：多者胜，相等为和
    pub fn outcome(&self) -> Outcome {
        use std::cmp::Ordering;
        match self.black.cmp(&self.white) {
            Ordering::Greater => Outcome::Winner(Side::Black),
            Ordering::Less => Outcome::Winner(Side::White),
            Ordering::Equal => Outcome::Draw,
        }
    }
}

/// 完整的对局快照（线上的 `game_state`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub current_player: Side,
    /// 是否终局
    pub game_over: bool,
    /// 胜者（对局进行中为 null）
    pub winner: Option<Outcome>,
    /// 当前走子方的合法落点
    pub valid_moves: Vec<Position>,
    /// 双方子数
    pub scores: Scores,
}

impl GameSnapshot {
    /// 从棋盘与回合信息生成快照
    pub fn new(
        board: Board,
        current_player: Side,
        game_over: bool,
        winner: Option<Outcome>,
    ) -> Self {
        Self {
            valid_moves: MoveGenerator::legal_moves(&board, current_player),
            scores: board.scores(),
            board,
            current_player,
            game_over,
            winner,
        }
    }

    /// 初始局面快照
    pub fn initial() -> Self {
        Self::new(Board::initial(), Side::Black, false, None)
    }

    /// 检查落点是否在合法列表中
    pub fn is_valid_move(&self, pos: Position) -> bool {
        self.valid_moves.contains(&pos)
    }
}
