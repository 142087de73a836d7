//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（8x8）
pub const BOARD_SIZE: usize = 8;

/// 座位数（同时在线的玩家上限）
pub const MAX_SEATS: usize = 2;

/// 单行消息最大字节数（不含换行符）
pub const MAX_LINE_LEN: usize = 16 * 1024;

/// 每次读取的块大小
pub const READ_CHUNK_SIZE: usize = 4096;

/// 服务端默认监听地址
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// 客户端默认连接地址
pub const DEFAULT_CLIENT_HOST: &str = "localhost";

/// 默认端口
pub const DEFAULT_PORT: u16 = 5555;

/// 每个连接的发送队列容量
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 读轮询间隔（毫秒）- 每个间隔检查一次座位存活与停机信号
pub const READ_POLL_INTERVAL_MS: u64 = 500;

/// AI 默认搜索深度
pub const AI_SEARCH_DEPTH: u8 = 5;

/// AI 两次落子之间的最小间隔（毫秒）
pub const AI_MOVE_INTERVAL_MS: u64 = 1000;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 读轮询间隔 Duration
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(READ_POLL_INTERVAL_MS);
