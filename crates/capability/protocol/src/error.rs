//! 协议错误类型定义

/// 协议通信错误
///
/// 仅在传输层内部流转；对外的 [`crate::SnmpTransport`] 统一折叠为空值/false。
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误（地址解析、绑定失败等）
    #[error("connection error: {0}")]
    Connection(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 报文解析错误
    #[error("decode error: {0}")]
    Decode(String),

    /// 配置解析错误
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),

    /// 设备返回的协议级错误状态
    #[error("agent error status {status} ({name}) at {oid}")]
    ErrorStatus {
        status: i64,
        name: &'static str,
        oid: String,
    },
}
