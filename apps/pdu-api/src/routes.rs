//! 路由定义
//!
//! - 健康检查：/healthz
//! - 指标：/metrics
//! - 插座：/outlets, /outlets/:outlet_id, /outlets/:outlet_id/{toggle,cycle,history}

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(get_metrics))
        .route("/outlets", get(list_outlets))
        .route("/outlets/:outlet_id", get(get_outlet))
        .route("/outlets/:outlet_id/toggle", post(toggle_outlet))
        .route("/outlets/:outlet_id/cycle", post(cycle_outlet))
        .route("/outlets/:outlet_id/history", get(get_outlet_history))
}
