//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 错误响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 单插座读数。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletDto {
    pub id: String,
    pub name: String,
    pub state: String,
    pub voltage: f64,
    pub current: f64,
    pub observed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 全量插座列表，`degraded` 仅在返回占位数据时出现。
#[derive(Debug, Serialize)]
pub struct OutletListDto {
    pub outlets: Vec<OutletDto>,
    #[serde(skip_serializing_if = "is_false")]
    pub degraded: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// toggle / cycle 结果。成功时带完整读数，失败时只有 id / name / state / message / error。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResultDto {
    pub id: String,
    pub name: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 历史查询参数。
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// 历史读数条目。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletHistoryEntryDto {
    pub outlet_id: String,
    pub state: String,
    pub voltage: f64,
    pub current: f64,
    pub created_at: String,
}

/// 历史读数返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletHistoryDto {
    pub outlet_id: String,
    pub limit: usize,
    pub readings: Vec<OutletHistoryEntryDto>,
}

/// 健康检查返回结构。
#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub snmp_get_success: u64,
    pub snmp_get_failure: u64,
    pub snmp_set_success: u64,
    pub snmp_set_failure: u64,
    pub snmp_latency_ms_total: u64,
    pub snmp_latency_ms_count: u64,
    pub outlet_reads: u64,
    pub degraded_reads: u64,
    pub toggles: u64,
    pub cycles: u64,
    pub operation_failures: u64,
    pub sink_failures: u64,
    pub read_all_fallbacks: u64,
}
