//! # 插座控制模块
//!
//! - `address`：插座编号 + 物理量 → OID
//! - `interpreter`：设备状态码 ↔ 逻辑状态
//! - `service`：读取 / 全量读取 / toggle / cycle，含写后等待与降级
//! - `sleeper`：可替换的等待实现

pub mod address;
pub mod interpreter;
pub mod service;
pub mod sleeper;

pub use address::{DeviceAddressTable, Quantity, SensorCodes};
pub use interpreter::{StateCodes, StateInterpreter};
pub use service::{ControlError, OutletService, OutletServiceConfig};
pub use sleeper::{Sleeper, TokioSleeper};
