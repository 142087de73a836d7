//! 黑白棋终端客户端
//!
//! 包含:
//! - 客户端对局状态（由服务端消息驱动）
//! - 文本棋盘渲染
//! - 命令行输入解析

pub mod game;
pub mod input;
pub mod render;

pub use game::{ClientEvent, ClientGame};
pub use input::{parse_command, Command, InputError};
pub use render::{render_board, render_status};
