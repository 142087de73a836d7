//! 网络配置
//!
//! 三个可执行程序启动时都通过交互式提示读取主机与端口，
//! 直接回车或输入无法解析时使用默认值。

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_CLIENT_HOST, DEFAULT_PORT, DEFAULT_SERVER_HOST};

/// 网络配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl NetworkConfig {
    /// 服务端默认值：127.0.0.1:5555
    pub fn server_default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// 客户端默认值：localhost:5555
    pub fn client_default() -> Self {
        Self {
            host: DEFAULT_CLIENT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 从标准输入交互读取
    pub fn prompt(defaults: Self) -> io::Result<Self> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Self::prompt_from(defaults, &mut stdin.lock(), &mut stdout.lock())
    }

    /// 从任意输入流读取（先主机后端口）
    pub fn prompt_from<R: BufRead, W: Write>(
        defaults: Self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<Self> {
        write!(output, "Host [{}]: ", defaults.host)?;
        output.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        let host = match line.trim() {
            "" => defaults.host,
            host => host.to_string(),
        };

        write!(output, "Port [{}]: ", defaults.port)?;
        output.flush()?;
        line.clear();
        input.read_line(&mut line)?;
        let port = line.trim().parse().unwrap_or(defaults.port);

        Ok(Self { host, port })
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::server_default()
    }
}
