//! Supabase（PostgREST）观测存储实现
//!
//! 表结构：
//! - `outlet_readings`：outlet_id, state, voltage, current, created_at
//! - `outlet_events`：outlet_id, event_type, new_state, user_initiated
//! - `agents`：id, status, updated_at
//!
//! 所有请求都带 `apikey` 与 `Authorization: Bearer` 头，写入使用 `Prefer: return=minimal`。

use crate::error::SinkError;
use crate::models::{AgentStatus, OutletEvent, OutletEventRow, OutletReadingRecord, format_timestamp};
use crate::traits::ObservationSink;
use async_trait::async_trait;
use domain::{OutletId, OutletReading, now_epoch_ms};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// REST sink 配置
#[derive(Debug, Clone)]
pub struct RestSinkConfig {
    /// 项目地址，例如 `https://xyz.supabase.co`
    pub url: String,
    /// service role key
    pub service_key: String,
    /// `agents` 表中本 agent 的行 id
    pub agent_id: Option<String>,
    /// 单次请求超时（毫秒）
    pub timeout_ms: u64,
}

/// 基于 PostgREST 的观测存储
pub struct RestObservationSink {
    client: Client,
    base_url: String,
    service_key: String,
    agent_id: Option<String>,
}

impl RestObservationSink {
    pub fn new(config: RestSinkConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            service_key: config.service_key,
            agent_id: config.agent_id,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn send_write(&self, request: RequestBuilder) -> Result<Response, SinkError> {
        let response = self
            .authorized(request)
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, SinkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SinkError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ObservationSink for RestObservationSink {
    fn is_connected(&self) -> bool {
        true
    }

    async fn log_outlet_state(&self, reading: &OutletReading) -> Result<(), SinkError> {
        let record = OutletReadingRecord::from_reading(reading);
        let request = self.client.post(self.table_url("outlet_readings")).json(&record);
        self.send_write(request).await?;
        debug!(target: "pdu.storage", outlet_id = %reading.id, "outlet_reading_logged");
        Ok(())
    }

    async fn log_outlet_event(&self, event: &OutletEvent) -> Result<(), SinkError> {
        let row = OutletEventRow::from(event);
        let request = self.client.post(self.table_url("outlet_events")).json(&row);
        self.send_write(request).await?;
        debug!(
            target: "pdu.storage",
            outlet_id = %event.outlet_id,
            event_type = event.kind.as_str(),
            "outlet_event_logged"
        );
        Ok(())
    }

    async fn update_agent_status(&self, status: AgentStatus) -> Result<(), SinkError> {
        let agent_id = self.agent_id.as_deref().ok_or(SinkError::MissingAgentId)?;
        let body = json!({
            "status": status.as_str(),
            "updated_at": format_timestamp(now_epoch_ms()),
        });
        let request = self
            .client
            .patch(self.table_url("agents"))
            .query(&[("id", format!("eq.{}", agent_id))])
            .json(&body);
        self.send_write(request).await?;
        debug!(target: "pdu.storage", agent_id = agent_id, status = status.as_str(), "agent_status_updated");
        Ok(())
    }

    async fn get_outlet_history(
        &self,
        outlet_id: OutletId,
        limit: usize,
    ) -> Result<Vec<OutletReadingRecord>, SinkError> {
        let request = self.client.get(self.table_url("outlet_readings")).query(&[
            ("select", "*".to_string()),
            ("outlet_id", format!("eq.{}", outlet_id)),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ]);
        let response = ensure_success(self.authorized(request).send().await?).await?;
        let records = response.json::<Vec<OutletReadingRecord>>().await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let sink = RestObservationSink::new(RestSinkConfig {
            url: "https://example.supabase.co/".to_string(),
            service_key: "key".to_string(),
            agent_id: None,
            timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(
            sink.table_url("outlet_readings"),
            "https://example.supabase.co/rest/v1/outlet_readings"
        );
    }
}
