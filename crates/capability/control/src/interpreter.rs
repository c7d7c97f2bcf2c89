//! 设备状态码与逻辑状态之间的转换。
//!
//! 读取方向：主 on 码或次 on 码 → `On`；读不到值 → `Unknown`；其他任何值 → `Off`。
//! 写入方向：`On` / `Off` / `Cycle` 各自对应一个设备码，cycle 由设备原生执行断电再上电。

use domain::{OutletState, TargetState};
use pdu_protocol::SnmpValue;

/// 设备状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCodes {
    pub on: i64,
    pub off: i64,
    pub cycle: i64,
    /// 部分固件读回的另一个 "on" 码
    pub on_secondary: Option<i64>,
}

impl Default for StateCodes {
    fn default() -> Self {
        Self {
            on: 1,
            off: 0,
            cycle: 2,
            on_secondary: Some(7),
        }
    }
}

/// 状态解释器
#[derive(Debug, Clone, Copy, Default)]
pub struct StateInterpreter {
    codes: StateCodes,
}

impl StateInterpreter {
    pub fn new(codes: StateCodes) -> Self {
        Self { codes }
    }

    pub fn codes(&self) -> StateCodes {
        self.codes
    }

    pub fn to_logical_state(&self, raw: &SnmpValue) -> OutletState {
        if raw.is_empty() {
            return OutletState::Unknown;
        }
        match raw.as_i64() {
            Some(code) if code == self.codes.on || Some(code) == self.codes.on_secondary => {
                OutletState::On
            }
            _ => OutletState::Off,
        }
    }

    pub fn to_write_code(&self, target: TargetState) -> SnmpValue {
        let code = match target {
            TargetState::On => self.codes.on,
            TargetState::Off => self.codes.off,
            TargetState::Cycle => self.codes.cycle,
        };
        SnmpValue::Integer(code)
    }
}
