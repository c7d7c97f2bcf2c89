//! 追踪、请求 ID 生成与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 进程级计数器。
pub struct TelemetryMetrics {
    snmp_get_success: AtomicU64,
    snmp_get_failure: AtomicU64,
    snmp_set_success: AtomicU64,
    snmp_set_failure: AtomicU64,
    snmp_latency_ms_total: AtomicU64,
    snmp_latency_ms_count: AtomicU64,
    outlet_reads: AtomicU64,
    degraded_reads: AtomicU64,
    toggles: AtomicU64,
    cycles: AtomicU64,
    operation_failures: AtomicU64,
    sink_failures: AtomicU64,
    read_all_fallbacks: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            snmp_get_success: AtomicU64::new(0),
            snmp_get_failure: AtomicU64::new(0),
            snmp_set_success: AtomicU64::new(0),
            snmp_set_failure: AtomicU64::new(0),
            snmp_latency_ms_total: AtomicU64::new(0),
            snmp_latency_ms_count: AtomicU64::new(0),
            outlet_reads: AtomicU64::new(0),
            degraded_reads: AtomicU64::new(0),
            toggles: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            operation_failures: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            read_all_fallbacks: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            snmp_get_success: self.snmp_get_success.load(Ordering::Relaxed),
            snmp_get_failure: self.snmp_get_failure.load(Ordering::Relaxed),
            snmp_set_success: self.snmp_set_success.load(Ordering::Relaxed),
            snmp_set_failure: self.snmp_set_failure.load(Ordering::Relaxed),
            snmp_latency_ms_total: self.snmp_latency_ms_total.load(Ordering::Relaxed),
            snmp_latency_ms_count: self.snmp_latency_ms_count.load(Ordering::Relaxed),
            outlet_reads: self.outlet_reads.load(Ordering::Relaxed),
            degraded_reads: self.degraded_reads.load(Ordering::Relaxed),
            toggles: self.toggles.load(Ordering::Relaxed),
            cycles: self.cycles.load(Ordering::Relaxed),
            operation_failures: self.operation_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            read_all_fallbacks: self.read_all_fallbacks.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录 SNMP GET 结果。
pub fn record_snmp_get(success: bool) {
    let counter = if success {
        &metrics().snmp_get_success
    } else {
        &metrics().snmp_get_failure
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

/// 记录 SNMP SET 结果。
pub fn record_snmp_set(success: bool) {
    let counter = if success {
        &metrics().snmp_set_success
    } else {
        &metrics().snmp_set_failure
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

/// 记录单次 SNMP 往返耗时（毫秒，含重发）。
pub fn record_snmp_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .snmp_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .snmp_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录单插座读取次数。
pub fn record_outlet_read() {
    metrics().outlet_reads.fetch_add(1, Ordering::Relaxed);
}

/// 记录降级读数次数。
pub fn record_degraded_read() {
    metrics().degraded_reads.fetch_add(1, Ordering::Relaxed);
}

/// 记录 toggle 请求次数。
pub fn record_toggle() {
    metrics().toggles.fetch_add(1, Ordering::Relaxed);
}

/// 记录 cycle 请求次数。
pub fn record_cycle() {
    metrics().cycles.fetch_add(1, Ordering::Relaxed);
}

/// 记录 toggle / cycle 写入失败次数。
pub fn record_operation_failure() {
    metrics()
        .operation_failures
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录观测存储写入失败次数。
pub fn record_sink_failure() {
    metrics().sink_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录全量读取回退到占位数据的次数。
pub fn record_read_all_fallback() {
    metrics()
        .read_all_fallbacks
        .fetch_add(1, Ordering::Relaxed);
}
