//! 观测存储接口 Trait 定义
//!
//! 设计原则：
//! - 调用方在写入前先检查 `is_connected`，未连接时直接跳过
//! - 所有写入失败都以 `SinkError` 返回，由调用方决定记录或忽略
//! - 使用 async_trait 支持动态分发（`Arc<dyn ObservationSink>`）

use crate::error::SinkError;
use crate::models::{AgentStatus, OutletEvent, OutletReadingRecord};
use async_trait::async_trait;
use domain::{OutletId, OutletReading};

/// 插座观测存储接口
#[async_trait]
pub trait ObservationSink: Send + Sync {
    /// 远端存储是否可用
    fn is_connected(&self) -> bool;

    /// 记录一次插座读数
    async fn log_outlet_state(&self, reading: &OutletReading) -> Result<(), SinkError>;

    /// 记录一次插座操作事件
    async fn log_outlet_event(&self, event: &OutletEvent) -> Result<(), SinkError>;

    /// 更新 agent 状态
    async fn update_agent_status(&self, status: AgentStatus) -> Result<(), SinkError>;

    /// 查询插座历史读数（按时间倒序，最多 `limit` 条）
    async fn get_outlet_history(
        &self,
        outlet_id: OutletId,
        limit: usize,
    ) -> Result<Vec<OutletReadingRecord>, SinkError>;
}
