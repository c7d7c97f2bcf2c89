use api_contract::HealthDto;
use axum::{Json, response::IntoResponse};

pub async fn healthz() -> impl IntoResponse {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}
