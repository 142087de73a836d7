//! 输入处理

use protocol::Position;
use thiserror::Error;

/// 玩家命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 落子
    Move(Position),
    /// 重新显示棋盘
    Board,
    /// 请 AI 给出建议落点
    Hint,
    /// 帮助
    Help,
    /// 退出
    Quit,
}

/// 输入错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Empty input")]
    Empty,

    #[error("Unrecognized input: {0} (type `help` for usage)")]
    Unrecognized(String),

    #[error("Position out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },
}

/// 用法说明
pub const HELP: &str = "\
Commands:
  <row> <col>   place a disc, e.g. `2 3` or `2,3`
  board         redraw the board
  hint          ask the AI for a suggestion
  help          show this help
  quit          leave the game";

/// 解析一行输入
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InputError::Empty);
    }

    match line.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(Command::Quit),
        "h" | "help" | "?" => return Ok(Command::Help),
        "b" | "board" => return Ok(Command::Board),
        "hint" => return Ok(Command::Hint),
        _ => {}
    }

    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    let [row, col] = parts.as_slice() else {
        return Err(InputError::Unrecognized(line.to_string()));
    };
    let (Ok(row), Ok(col)) = (row.parse::<u8>(), col.parse::<u8>()) else {
        return Err(InputError::Unrecognized(line.to_string()));
    };

    Position::new(row, col)
        .map(Command::Move)
        .ok_or(InputError::OutOfRange { row, col })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let expected = Command::Move(Position::new_unchecked(2, 3));
        assert_eq!(parse_command("2 3"), Ok(expected));
        assert_eq!(parse_command("  2   3\n"), Ok(expected));
        assert_eq!(parse_command("2,3"), Ok(expected));
        assert_eq!(parse_command("2, 3"), Ok(expected));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("Q"), Ok(Command::Quit));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("board"), Ok(Command::Board));
        assert_eq!(parse_command("hint"), Ok(Command::Hint));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(InputError::Empty));
        assert_eq!(parse_command("8 0"), Err(InputError::OutOfRange { row: 8, col: 0 }));
        assert!(matches!(parse_command("2"), Err(InputError::Unrecognized(_))));
        assert!(matches!(parse_command("1 2 3"), Err(InputError::Unrecognized(_))));
        assert!(matches!(parse_command("a b"), Err(InputError::Unrecognized(_))));
        assert!(matches!(parse_command("-1 2"), Err(InputError::Unrecognized(_))));
    }
}
