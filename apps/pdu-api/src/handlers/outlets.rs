//! 插座接口
//!
//! - GET  /outlets
//! - GET  /outlets/:outlet_id
//! - POST /outlets/:outlet_id/toggle
//! - POST /outlets/:outlet_id/cycle
//! - GET  /outlets/:outlet_id/history?limit=N

use api_contract::HistoryQuery;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::AppState;
use crate::utils::response::{
    history_to_dto, invalid_outlet_error, operation_response, outlet_list_to_dto,
    reading_to_dto, sink_error, sink_unavailable_error,
};
use crate::utils::validation::normalize_history_limit;

pub async fn list_outlets(State(state): State<AppState>) -> Response {
    let list = state.outlets.list_outlets().await;
    (StatusCode::OK, Json(outlet_list_to_dto(list))).into_response()
}

pub async fn get_outlet(State(state): State<AppState>, Path(outlet_id): Path<String>) -> Response {
    match state.outlets.get_outlet(&outlet_id).await {
        Ok(outcome) => (StatusCode::OK, Json(reading_to_dto(outcome.into_reading()))).into_response(),
        Err(err) => invalid_outlet_error(err),
    }
}

pub async fn toggle_outlet(
    State(state): State<AppState>,
    Path(outlet_id): Path<String>,
) -> Response {
    match state.outlets.toggle(&outlet_id).await {
        Ok(outcome) => operation_response(outcome),
        Err(err) => invalid_outlet_error(err),
    }
}

pub async fn cycle_outlet(
    State(state): State<AppState>,
    Path(outlet_id): Path<String>,
) -> Response {
    match state.outlets.cycle(&outlet_id).await {
        Ok(outcome) => operation_response(outcome),
        Err(err) => invalid_outlet_error(err),
    }
}

pub async fn get_outlet_history(
    State(state): State<AppState>,
    Path(outlet_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let id = match state.outlets.parse_outlet(&outlet_id) {
        Ok(id) => id,
        Err(err) => return invalid_outlet_error(err),
    };
    let sink = state.outlets.sink();
    if !sink.is_connected() {
        return sink_unavailable_error();
    }
    let limit = normalize_history_limit(query.limit);
    match sink.get_outlet_history(id, limit).await {
        Ok(records) => {
            info!(
                target: "pdu.api",
                outlet_id = %id,
                limit = limit,
                count = records.len(),
                "outlet_history_loaded"
            );
            (StatusCode::OK, Json(history_to_dto(id, limit, records))).into_response()
        }
        Err(err) => sink_error(err),
    }
}
