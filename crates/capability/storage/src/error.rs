//! 观测存储错误类型
//!
//! 所有 sink 实现统一返回 `SinkError`：
//! - `Disconnected`：未配置远端存储（HTTP 层映射为 503）
//! - 其余变体：请求失败、远端拒绝、响应无法解析

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("observation store not connected")]
    Disconnected,
    #[error("agent id not configured")]
    MissingAgentId,
    #[error("request failed: {0}")]
    Request(String),
    #[error("store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("lock failed")]
    Lock,
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
