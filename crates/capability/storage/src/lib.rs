//! # PDU Storage 模块
//!
//! 本模块提供插座观测数据的存储抽象（Observation Sink），供控制层在读取与操作后镜像结果。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：`ObservationSink` 异步 Trait
//! 2. **数据模型层** (`models.rs`)：读数记录、操作事件、agent 状态
//! 3. **错误处理层** (`error.rs`)：统一的 `SinkError`
//! 4. **实现层**：
//!    - `disconnected`：未配置远端存储时使用，`is_connected() == false`
//!    - `in_memory/`：内存实现（测试与本地运行）
//!    - `rest`：Supabase PostgREST 实现（生产环境）
//!
//! ## 调用约定
//!
//! - 调用方先检查 `is_connected()`，为 false 时不发起任何写入
//! - 写入失败只影响观测数据本身，不得改变插座操作的返回结果
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use pdu_storage::{ObservationSink, RestObservationSink, RestSinkConfig};
//!
//! let sink = RestObservationSink::new(RestSinkConfig {
//!     url: "https://xyz.supabase.co".to_string(),
//!     service_key: key,
//!     agent_id: Some("agent-1".to_string()),
//!     timeout_ms: 5000,
//! })?;
//! sink.log_outlet_state(&reading).await?;
//! ```

pub mod disconnected;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod rest;
pub mod traits;

pub use disconnected::DisconnectedSink;
pub use error::*;
pub use in_memory::InMemoryObservationSink;
pub use models::*;
pub use rest::{RestObservationSink, RestSinkConfig};
pub use traits::*;
