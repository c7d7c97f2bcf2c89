pub mod outlet;

pub use outlet::{
    DEFAULT_CURRENT, DEFAULT_VOLTAGE, OperationOutcome, OutletId, OutletIdError, OutletList,
    OutletReading, OutletState, ReadOutcome, TargetState,
};

/// 当前 Unix 时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
