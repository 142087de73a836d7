//! 服务端错误类型

use protocol::ProtocolError;
use thiserror::Error;

/// 服务端错误
#[derive(Error, Debug)]
pub enum ServerError {
    /// 座位已满（第三个连接）
    #[error("All {max} seats are taken")]
    Capacity { max: usize },

    /// 协议 / 网络错误
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
