//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：invalid_outlet_error, sink_unavailable_error, sink_error
//! - DTO 转换：reading_to_dto, outlet_list_to_dto, operation_to_dto, history_to_dto
//!
//! 读取接口始终返回 200（降级信息在 body 的 `state` / `error` 中），
//! toggle / cycle 结果带 `error` 时返回 500。

use api_contract::{
    ApiResponse, OperationResultDto, OutletDto, OutletHistoryDto, OutletHistoryEntryDto,
    OutletListDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{OperationOutcome, OutletId, OutletList, OutletReading};
use pdu_control::ControlError;
use pdu_storage::{OutletReadingRecord, SinkError, format_timestamp};

/// 非法插座编号响应
pub fn invalid_outlet_error(err: ControlError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("OUTLET.INVALID_ID", err.to_string())),
    )
        .into_response()
}

/// 观测存储未连接响应
pub fn sink_unavailable_error() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::<()>::error(
            "SINK.UNAVAILABLE",
            "observation store connection not available",
        )),
    )
        .into_response()
}

/// 观测存储错误响应
pub fn sink_error(err: SinkError) -> Response {
    if matches!(err, SinkError::Disconnected) {
        return sink_unavailable_error();
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("SINK.ERROR", err.to_string())),
    )
        .into_response()
}

/// toggle / cycle 结果响应
pub fn operation_response(outcome: OperationOutcome) -> Response {
    let status = if outcome.error().is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(operation_to_dto(outcome))).into_response()
}

/// OutletReading 转 OutletDto
pub fn reading_to_dto(reading: OutletReading) -> OutletDto {
    OutletDto {
        id: reading.id.to_string(),
        name: reading.name,
        state: reading.state.as_str().to_string(),
        voltage: reading.voltage,
        current: reading.current,
        observed_at: format_timestamp(reading.observed_at_ms),
        error: reading.error,
    }
}

/// OutletList 转 OutletListDto
pub fn outlet_list_to_dto(list: OutletList) -> OutletListDto {
    OutletListDto {
        outlets: list.outlets.into_iter().map(reading_to_dto).collect(),
        degraded: list.degraded,
    }
}

/// OperationOutcome 转 OperationResultDto
pub fn operation_to_dto(outcome: OperationOutcome) -> OperationResultDto {
    match outcome {
        OperationOutcome::Completed { reading, message } => OperationResultDto {
            id: reading.id.to_string(),
            name: reading.name,
            state: reading.state.as_str().to_string(),
            voltage: Some(reading.voltage),
            current: Some(reading.current),
            observed_at: Some(format_timestamp(reading.observed_at_ms)),
            message,
            error: reading.error,
        },
        OperationOutcome::Failed {
            id,
            name,
            state,
            message,
            error,
        } => OperationResultDto {
            id: id.to_string(),
            name,
            state: state.as_str().to_string(),
            voltage: None,
            current: None,
            observed_at: None,
            message,
            error: Some(error),
        },
    }
}

/// 历史记录转 OutletHistoryDto
pub fn history_to_dto(
    outlet_id: OutletId,
    limit: usize,
    records: Vec<OutletReadingRecord>,
) -> OutletHistoryDto {
    OutletHistoryDto {
        outlet_id: outlet_id.to_string(),
        limit,
        readings: records
            .into_iter()
            .map(|record| OutletHistoryEntryDto {
                outlet_id: record.outlet_id,
                state: record.state,
                voltage: record.voltage,
                current: record.current,
                created_at: record.created_at,
            })
            .collect(),
    }
}
