//! 数据模型
//!
//! - 读数记录：OutletReadingRecord（对应 `outlet_readings` 表的一行）
//! - 操作事件：OutletEvent（对应 `outlet_events` 表）
//! - Agent 状态：AgentStatus（对应 `agents.status` 列）

use chrono::{DateTime, SecondsFormat, Utc};
use domain::{OutletId, OutletReading, OutletState};
use serde::{Deserialize, Serialize};

/// 插座读数记录。写入时由 `OutletReading` 转换，查询历史时原样反序列化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletReadingRecord {
    pub outlet_id: String,
    pub state: String,
    pub voltage: f64,
    pub current: f64,
    pub created_at: String,
}

impl OutletReadingRecord {
    pub fn from_reading(reading: &OutletReading) -> Self {
        Self {
            outlet_id: reading.id.to_string(),
            state: reading.state.as_str().to_string(),
            voltage: reading.voltage,
            current: reading.current,
            created_at: format_timestamp(reading.observed_at_ms),
        }
    }
}

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutletEventKind {
    Toggle,
    Cycle,
}

impl OutletEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Cycle => "cycle",
        }
    }
}

/// 插座操作事件（成功的 toggle / cycle 之后记录）。
#[derive(Debug, Clone, PartialEq)]
pub struct OutletEvent {
    pub outlet_id: OutletId,
    pub kind: OutletEventKind,
    pub new_state: Option<OutletState>,
    pub user_initiated: bool,
}

impl OutletEvent {
    pub fn user(outlet_id: OutletId, kind: OutletEventKind, new_state: OutletState) -> Self {
        Self {
            outlet_id,
            kind,
            new_state: Some(new_state),
            user_initiated: true,
        }
    }
}

/// `outlet_events` 表的写入行
#[derive(Debug, Clone, Serialize)]
pub(crate) struct OutletEventRow<'a> {
    pub outlet_id: String,
    pub event_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_state: Option<&'a str>,
    pub user_initiated: bool,
}

impl<'a> From<&'a OutletEvent> for OutletEventRow<'a> {
    fn from(event: &'a OutletEvent) -> Self {
        Self {
            outlet_id: event.outlet_id.to_string(),
            event_type: event.kind.as_str(),
            new_state: event.new_state.map(OutletState::as_str),
            user_initiated: event.user_initiated,
        }
    }
}

/// Agent 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Connected,
    Disconnected,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// 毫秒时间戳格式化为 RFC3339（UTC，毫秒精度）。
pub fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
