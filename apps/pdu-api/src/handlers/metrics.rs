//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pdu_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            snmp_get_success: snapshot.snmp_get_success,
            snmp_get_failure: snapshot.snmp_get_failure,
            snmp_set_success: snapshot.snmp_set_success,
            snmp_set_failure: snapshot.snmp_set_failure,
            snmp_latency_ms_total: snapshot.snmp_latency_ms_total,
            snmp_latency_ms_count: snapshot.snmp_latency_ms_count,
            outlet_reads: snapshot.outlet_reads,
            degraded_reads: snapshot.degraded_reads,
            toggles: snapshot.toggles,
            cycles: snapshot.cycles,
            operation_failures: snapshot.operation_failures,
            sink_failures: snapshot.sink_failures,
            read_all_fallbacks: snapshot.read_all_fallbacks,
        })),
    )
        .into_response()
}
