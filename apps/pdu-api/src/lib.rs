//! PDU 插座控制 HTTP API。
//!
//! 路由、handler 与中间件在此组装，`main.rs` 只负责加载配置与启动监听。

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::Router;
use pdu_control::OutletService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// handler 共享状态。
#[derive(Clone)]
pub struct AppState {
    pub outlets: OutletService,
}

/// 构建带中间件的完整应用。
pub fn build_app(state: AppState) -> Router {
    routes::create_router()
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
