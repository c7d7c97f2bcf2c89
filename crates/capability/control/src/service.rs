use crate::address::{DeviceAddressTable, Quantity};
use crate::interpreter::{StateCodes, StateInterpreter};
use crate::sleeper::{Sleeper, TokioSleeper};
use domain::{
    DEFAULT_CURRENT, DEFAULT_VOLTAGE, OperationOutcome, OutletId, OutletIdError, OutletList,
    OutletReading, OutletState, ReadOutcome, TargetState, now_epoch_ms,
};
use pdu_protocol::{SnmpTransport, SnmpValue};
use pdu_storage::{ObservationSink, OutletEvent, OutletEventKind};
use pdu_telemetry::{
    record_cycle, record_degraded_read, record_operation_failure, record_outlet_read,
    record_read_all_fallback, record_sink_failure, record_toggle,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const SET_FAILED: &str = "SNMP SET operation failed";
const STATE_UNAVAILABLE: &str = "outlet state unavailable";

/// 控制链路错误（仅调用方错误，设备故障体现在结果中）。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid outlet id: {0}")]
    InvalidOutlet(#[from] OutletIdError),
}

/// 插座服务配置。
#[derive(Debug, Clone)]
pub struct OutletServiceConfig {
    pub outlet_count: u32,
    /// toggle 写入后等待设备稳定的时长
    pub toggle_settle: Duration,
    /// cycle 写入后等待断电再上电完成的时长
    pub cycle_settle: Duration,
}

impl Default for OutletServiceConfig {
    fn default() -> Self {
        Self {
            outlet_count: 8,
            toggle_settle: Duration::from_secs(1),
            cycle_settle: Duration::from_secs(5),
        }
    }
}

/// 插座读取与操作服务。
///
/// 设备不可达时所有操作都返回降级但完整的结果；只有非法插座编号会以 `ControlError` 拒绝，
/// 且拒绝发生在任何设备 I/O 之前。
#[derive(Clone)]
pub struct OutletService {
    transport: Arc<dyn SnmpTransport>,
    sink: Arc<dyn ObservationSink>,
    sleeper: Arc<dyn Sleeper>,
    addresses: Arc<DeviceAddressTable>,
    interpreter: StateInterpreter,
    config: OutletServiceConfig,
}

impl OutletService {
    pub fn new(
        transport: Arc<dyn SnmpTransport>,
        sink: Arc<dyn ObservationSink>,
        addresses: DeviceAddressTable,
        codes: StateCodes,
        config: OutletServiceConfig,
    ) -> Self {
        Self {
            transport,
            sink,
            sleeper: Arc::new(TokioSleeper),
            addresses: Arc::new(addresses),
            interpreter: StateInterpreter::new(codes),
            config,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn outlet_count(&self) -> u32 {
        self.config.outlet_count
    }

    pub fn sink(&self) -> &Arc<dyn ObservationSink> {
        &self.sink
    }

    /// 校验外部传入的插座编号。
    pub fn parse_outlet(&self, raw: &str) -> Result<OutletId, ControlError> {
        Ok(OutletId::parse(raw, self.config.outlet_count)?)
    }

    /// 读取单个插座并镜像到观测存储（降级读数同样记录）。
    pub async fn get_outlet(&self, raw: &str) -> Result<ReadOutcome, ControlError> {
        let id = self.parse_outlet(raw)?;
        record_outlet_read();
        let outcome = self.read_outlet(id).await;
        if let ReadOutcome::Degraded(reading) = &outcome {
            record_degraded_read();
            warn!(
                target: "pdu.control",
                outlet_id = %id,
                error = reading.error.as_deref().unwrap_or_default(),
                "outlet_read_degraded"
            );
        }
        self.mirror_reading(outcome.reading()).await;
        Ok(outcome)
    }

    /// 读取全部插座（按编号升序）。枚举本身失败时返回带 `degraded` 标记的占位列表。
    pub async fn list_outlets(&self) -> OutletList {
        match self.read_all().await {
            Ok(outlets) => OutletList {
                outlets,
                degraded: false,
            },
            Err(reason) => {
                record_read_all_fallback();
                warn!(target: "pdu.control", error = %reason, "outlet_list_fallback");
                OutletList {
                    outlets: placeholder_outlets(now_epoch_ms()),
                    degraded: true,
                }
            }
        }
    }

    /// 翻转插座状态：on → off，其余（off / unknown）→ on。
    pub async fn toggle(&self, raw: &str) -> Result<OperationOutcome, ControlError> {
        let id = self.parse_outlet(raw)?;
        record_toggle();
        let before = self.read_outlet(id).await.into_reading();
        let target = TargetState::toggled_from(before.state);
        info!(
            target: "pdu.control",
            outlet_id = %id,
            current_state = before.state.as_str(),
            target_state = target.as_str(),
            "outlet_toggle_requested"
        );
        if !self.write_target(id, target).await {
            return Ok(self.write_failed(id, before.state, "Failed to toggle outlet"));
        }
        self.sleeper.sleep(self.config.toggle_settle).await;
        let reading = self.read_outlet(id).await.into_reading();
        self.record_completed(&reading, OutletEventKind::Toggle).await;
        info!(target: "pdu.control", outlet_id = %id, state = reading.state.as_str(), "outlet_toggled");
        Ok(OperationOutcome::Completed {
            reading,
            message: format!("Outlet toggled to {} successfully", target.as_str()),
        })
    }

    /// 对插座执行断电再上电，不需要预读状态。
    pub async fn cycle(&self, raw: &str) -> Result<OperationOutcome, ControlError> {
        let id = self.parse_outlet(raw)?;
        record_cycle();
        info!(target: "pdu.control", outlet_id = %id, "outlet_cycle_requested");
        if !self.write_target(id, TargetState::Cycle).await {
            return Ok(self.write_failed(id, OutletState::Unknown, "Failed to cycle outlet"));
        }
        self.sleeper.sleep(self.config.cycle_settle).await;
        let reading = self.read_outlet(id).await.into_reading();
        self.record_completed(&reading, OutletEventKind::Cycle).await;
        info!(target: "pdu.control", outlet_id = %id, state = reading.state.as_str(), "outlet_cycled");
        Ok(OperationOutcome::Completed {
            reading,
            message: "Outlet cycled successfully".to_string(),
        })
    }

    /// 单插座读取：状态、入口电压、插座电流依次读取，缺失的传感器值使用默认值。
    async fn read_outlet(&self, id: OutletId) -> ReadOutcome {
        let state_oid = self.addresses.address_for(Quantity::OutletState, id, None);
        let voltage_oid = self.addresses.address_for(Quantity::InletVoltage, id, None);
        let current_oid = self.addresses.address_for(Quantity::OutletCurrent, id, None);

        let raw_state = self.transport.get(&state_oid).await;
        let voltage = sensor_value(self.transport.get(&voltage_oid).await, DEFAULT_VOLTAGE);
        let current = sensor_value(self.transport.get(&current_oid).await, DEFAULT_CURRENT);
        let state = self.interpreter.to_logical_state(&raw_state);
        debug!(
            target: "pdu.control",
            outlet_id = %id,
            raw_state = ?raw_state,
            state = state.as_str(),
            voltage = voltage,
            current = current,
            "outlet_read"
        );

        let degraded = state == OutletState::Unknown;
        let reading = OutletReading {
            id,
            name: id.display_name(),
            state,
            voltage,
            current,
            observed_at_ms: now_epoch_ms(),
            error: degraded.then(|| STATE_UNAVAILABLE.to_string()),
        };
        if degraded {
            ReadOutcome::Degraded(reading)
        } else {
            ReadOutcome::Ok(reading)
        }
    }

    async fn read_all(&self) -> Result<Vec<OutletReading>, String> {
        let mut tasks = JoinSet::new();
        for n in 1..=self.config.outlet_count {
            let id = OutletId::new(n).ok_or_else(|| format!("invalid outlet number {}", n))?;
            let service = self.clone();
            tasks.spawn(async move { service.read_outlet(id).await.into_reading() });
        }
        let mut outlets = Vec::with_capacity(self.config.outlet_count as usize);
        while let Some(joined) = tasks.join_next().await {
            outlets.push(joined.map_err(|err| err.to_string())?);
        }
        outlets.sort_by_key(|reading| reading.id);
        Ok(outlets)
    }

    async fn write_target(&self, id: OutletId, target: TargetState) -> bool {
        let control_oid = self.addresses.address_for(Quantity::OutletControl, id, None);
        let code = self.interpreter.to_write_code(target);
        self.transport.set(&control_oid, code).await
    }

    fn write_failed(&self, id: OutletId, state: OutletState, message: &str) -> OperationOutcome {
        record_operation_failure();
        warn!(target: "pdu.control", outlet_id = %id, reason = message, "outlet_write_failed");
        OperationOutcome::Failed {
            id,
            name: id.display_name(),
            state,
            message: message.to_string(),
            error: SET_FAILED.to_string(),
        }
    }

    async fn record_completed(&self, reading: &OutletReading, kind: OutletEventKind) {
        self.mirror_reading(reading).await;
        if !self.sink.is_connected() {
            return;
        }
        let event = OutletEvent::user(reading.id, kind, reading.state);
        if let Err(err) = self.sink.log_outlet_event(&event).await {
            record_sink_failure();
            warn!(target: "pdu.control", outlet_id = %reading.id, error = %err, "outlet_event_log_failed");
        }
    }

    async fn mirror_reading(&self, reading: &OutletReading) {
        if !self.sink.is_connected() {
            return;
        }
        if let Err(err) = self.sink.log_outlet_state(reading).await {
            record_sink_failure();
            warn!(target: "pdu.control", outlet_id = %reading.id, error = %err, "outlet_reading_log_failed");
        }
    }
}

fn sensor_value(raw: SnmpValue, default: f64) -> f64 {
    raw.as_f64().unwrap_or(default)
}

/// 全量读取失败时返回的固定占位数据。
fn placeholder_outlets(observed_at_ms: i64) -> Vec<OutletReading> {
    [(1, OutletState::On, 5.0), (2, OutletState::Off, 0.0), (3, OutletState::On, 3.0)]
        .into_iter()
        .filter_map(|(n, state, current)| {
            let id = OutletId::new(n)?;
            Some(OutletReading {
                id,
                name: id.display_name(),
                state,
                voltage: DEFAULT_VOLTAGE,
                current,
                observed_at_ms,
                error: None,
            })
        })
        .collect()
}
