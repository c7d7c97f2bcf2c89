//! 观测数据内存实现

use crate::error::SinkError;
use crate::models::{AgentStatus, OutletEvent, OutletReadingRecord};
use crate::traits::ObservationSink;
use async_trait::async_trait;
use domain::{OutletId, OutletReading};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// 观测数据内存存储
///
/// `set_failing(true)` 后所有调用返回错误，用于验证调用方对存储故障的容忍。
pub struct InMemoryObservationSink {
    readings: RwLock<Vec<OutletReadingRecord>>,
    events: RwLock<Vec<OutletEvent>>,
    agent_status: RwLock<Option<AgentStatus>>,
    failing: AtomicBool,
}

impl InMemoryObservationSink {
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(Vec::new()),
            events: RwLock::new(Vec::new()),
            agent_status: RwLock::new(None),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn readings(&self) -> Vec<OutletReadingRecord> {
        self.readings
            .read()
            .map(|readings| readings.clone())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<OutletEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn agent_status(&self) -> Option<AgentStatus> {
        self.agent_status.read().ok().and_then(|status| *status)
    }

    fn check(&self) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Request("in-memory sink set to fail".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryObservationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObservationSink for InMemoryObservationSink {
    fn is_connected(&self) -> bool {
        true
    }

    async fn log_outlet_state(&self, reading: &OutletReading) -> Result<(), SinkError> {
        self.check()?;
        let mut readings = self.readings.write().map_err(|_| SinkError::Lock)?;
        readings.push(OutletReadingRecord::from_reading(reading));
        Ok(())
    }

    async fn log_outlet_event(&self, event: &OutletEvent) -> Result<(), SinkError> {
        self.check()?;
        let mut events = self.events.write().map_err(|_| SinkError::Lock)?;
        events.push(event.clone());
        Ok(())
    }

    async fn update_agent_status(&self, status: AgentStatus) -> Result<(), SinkError> {
        self.check()?;
        let mut current = self.agent_status.write().map_err(|_| SinkError::Lock)?;
        *current = Some(status);
        Ok(())
    }

    async fn get_outlet_history(
        &self,
        outlet_id: OutletId,
        limit: usize,
    ) -> Result<Vec<OutletReadingRecord>, SinkError> {
        self.check()?;
        let outlet_id = outlet_id.to_string();
        let readings = self.readings.read().map_err(|_| SinkError::Lock)?;
        // 写入顺序即时间顺序，倒序即最新在前
        Ok(readings
            .iter()
            .rev()
            .filter(|record| record.outlet_id == outlet_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
