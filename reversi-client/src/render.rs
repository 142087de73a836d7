//! 棋盘渲染（纯文本）

use std::fmt::Write;

use protocol::{Cell, GameSnapshot, Outcome, Position, Side, BOARD_SIZE};

const EMPTY: char = '.';
const VALID_MOVE: char = '*';

fn symbol(side: Side) -> char {
    match side {
        Side::Black => 'X',
        Side::White => 'O',
    }
}

/// 渲染棋盘。轮到 `me` 时用 `*` 标出合法落点；`me` 为 None 时总是标出
pub fn render_board(snapshot: &GameSnapshot, me: Option<Side>) -> String {
    let show_moves = !snapshot.game_over && me.map_or(true, |side| side == snapshot.current_player);

    let mut out = String::from("   ");
    for col in 0..BOARD_SIZE {
        let _ = write!(out, " {}", col);
    }
    out.push('\n');

    for (row, cells) in snapshot.board.rows().iter().enumerate() {
        let _ = write!(out, " {} ", row);
        for (col, cell) in cells.iter().enumerate() {
            let ch = match cell {
                Cell::Black => symbol(Side::Black),
                Cell::White => symbol(Side::White),
                Cell::Empty => {
                    let pos = Position::new_unchecked(row as u8, col as u8);
                    if show_moves && snapshot.is_valid_move(pos) {
                        VALID_MOVE
                    } else {
                        EMPTY
                    }
                }
            };
            let _ = write!(out, " {}", ch);
        }
        out.push('\n');
    }
    out
}

/// 比分与回合提示
pub fn render_status(snapshot: &GameSnapshot, me: Option<Side>) -> String {
    let scores = &snapshot.scores;
    let mut out = format!(
        "{} ({}): {}   {} ({}): {}\n",
        Side::Black,
        symbol(Side::Black),
        scores.black,
        Side::White,
        symbol(Side::White),
        scores.white
    );

    if snapshot.game_over {
        let result = match snapshot.winner.unwrap_or_else(|| scores.outcome()) {
            Outcome::Winner(side) if Some(side) == me => "You win!".to_string(),
            Outcome::Winner(side) if me.is_some() => format!("You lose, {} wins", side),
            Outcome::Winner(side) => format!("{} wins", side),
            Outcome::Draw => "Draw".to_string(),
        };
        let _ = write!(out, "Game over: {}", result);
    } else if me == Some(snapshot.current_player) {
        let _ = write!(out, "Turn: {} (your move)", snapshot.current_player);
    } else {
        let _ = write!(out, "Turn: {}", snapshot.current_player);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Board, MoveGenerator};

    #[test]
    fn test_initial_board_with_markers() {
        let text = render_board(&GameSnapshot::initial(), Some(Side::Black));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "    0 1 2 3 4 5 6 7");
        assert_eq!(lines[3], " 2  . . . * . . . .");
        assert_eq!(lines[4], " 3  . . * O X . . .");
        assert_eq!(lines[5], " 4  . . . X O * . .");
        assert_eq!(lines[6], " 5  . . . . * . . .");
    }

    #[test]
    fn test_markers_hidden_on_opponent_turn() {
        let text = render_board(&GameSnapshot::initial(), Some(Side::White));
        assert!(!text.contains(VALID_MOVE));
    }

    #[test]
    fn test_status_lines() {
        let snapshot = GameSnapshot::initial();
        assert_eq!(
            render_status(&snapshot, Some(Side::Black)),
            "Black (X): 2   White (O): 2\nTurn: Black (your move)"
        );
        assert!(render_status(&snapshot, Some(Side::White)).ends_with("Turn: Black"));
    }

    #[test]
    fn test_game_over_status() {
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 0), Cell::White);
        board.set(Position::new_unchecked(0, 1), Cell::Black);
        let board =
            MoveGenerator::apply_move(&board, Position::new_unchecked(0, 2), Side::White).unwrap();
        let winner = Some(Outcome::Winner(Side::White));
        let snapshot = GameSnapshot::new(board, Side::White, true, winner);

        assert!(render_status(&snapshot, Some(Side::White)).ends_with("Game over: You win!"));
        assert!(render_status(&snapshot, Some(Side::Black))
            .ends_with("Game over: You lose, White wins"));
        assert!(!render_board(&snapshot, None).contains(VALID_MOVE));
    }
}
