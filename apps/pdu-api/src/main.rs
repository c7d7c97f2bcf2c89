//! PDU 插座控制 agent：加载配置、装配 SNMP 传输与观测存储、启动 HTTP 服务。

use pdu_api::{AppState, build_app};
use pdu_config::AppConfig;
use pdu_control::{OutletService, OutletServiceConfig};
use pdu_protocol::UdpSnmpTransport;
use pdu_storage::{
    AgentStatus, DisconnectedSink, ObservationSink, RestObservationSink, RestSinkConfig,
};
use pdu_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let transport = Arc::new(UdpSnmpTransport::new(config.snmp.clone()));
    let sink = build_sink(&config)?;
    let outlets = OutletService::new(
        transport,
        sink.clone(),
        config.addresses.clone(),
        config.state_codes,
        OutletServiceConfig {
            outlet_count: config.outlet_count,
            toggle_settle: Duration::from_millis(config.toggle_settle_ms),
            cycle_settle: Duration::from_millis(config.cycle_settle_ms),
        },
    );

    report_agent_status(sink.as_ref(), AgentStatus::Connected).await;

    let app = build_app(AppState { outlets });
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        target: "pdu.api",
        addr = %config.http_addr,
        snmp_host = %config.snmp.host,
        pdu_model = %config.pdu_model,
        outlet_count = config.outlet_count,
        "pdu_agent_listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    report_agent_status(sink.as_ref(), AgentStatus::Disconnected).await;
    info!(target: "pdu.api", "pdu_agent_stopped");
    Ok(())
}

/// Supabase 已配置时使用 REST sink，否则所有观测写入被跳过。
fn build_sink(config: &AppConfig) -> Result<Arc<dyn ObservationSink>, Box<dyn std::error::Error>> {
    match &config.supabase {
        Some(supabase) => {
            let sink = RestObservationSink::new(RestSinkConfig {
                url: supabase.url.clone(),
                service_key: supabase.service_key.clone(),
                agent_id: config.agent_id.clone(),
                timeout_ms: config.sink_timeout_ms,
            })?;
            info!(target: "pdu.api", url = %supabase.url, "observation_sink_enabled");
            Ok(Arc::new(sink))
        }
        None => {
            warn!(target: "pdu.api", "observation_sink_disabled");
            Ok(Arc::new(DisconnectedSink))
        }
    }
}

async fn report_agent_status(sink: &dyn ObservationSink, status: AgentStatus) {
    if !sink.is_connected() {
        return;
    }
    match sink.update_agent_status(status).await {
        Ok(()) => info!(target: "pdu.api", status = status.as_str(), "agent_status_reported"),
        Err(err) => warn!(
            target: "pdu.api",
            status = status.as_str(),
            error = %err,
            "agent_status_report_failed"
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target: "pdu.api", error = %err, "ctrl_c_handler_failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                warn!(target: "pdu.api", error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target: "pdu.api", "shutdown_signal_received");
}
