//! 未配置远端存储时使用的 sink。

use crate::error::SinkError;
use crate::models::{AgentStatus, OutletEvent, OutletReadingRecord};
use crate::traits::ObservationSink;
use async_trait::async_trait;
use domain::{OutletId, OutletReading};

/// 始终处于未连接状态的 sink
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedSink;

#[async_trait]
impl ObservationSink for DisconnectedSink {
    fn is_connected(&self) -> bool {
        false
    }

    async fn log_outlet_state(&self, _reading: &OutletReading) -> Result<(), SinkError> {
        Err(SinkError::Disconnected)
    }

    async fn log_outlet_event(&self, _event: &OutletEvent) -> Result<(), SinkError> {
        Err(SinkError::Disconnected)
    }

    async fn update_agent_status(&self, _status: AgentStatus) -> Result<(), SinkError> {
        Err(SinkError::Disconnected)
    }

    async fn get_outlet_history(
        &self,
        _outlet_id: OutletId,
        _limit: usize,
    ) -> Result<Vec<OutletReadingRecord>, SinkError> {
        Err(SinkError::Disconnected)
    }
}
