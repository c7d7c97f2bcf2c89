//! 插座编号 + 物理量 → SNMP OID 的映射。
//!
//! OID 组成规则：
//! - 状态 / 控制：`{prefix}.1.{outlet}`
//! - 入口传感器（电压）：`{prefix}.1.1.{sensor}`
//! - 插座传感器（电流）：`{prefix}.1.{outlet}.{sensor}`

use domain::OutletId;
use pdu_protocol::Oid;

/// 可寻址的物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    OutletState,
    OutletControl,
    InletVoltage,
    OutletCurrent,
}

/// 传感器子类型编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCodes {
    pub voltage: u32,
    pub current: u32,
}

impl Default for SensorCodes {
    fn default() -> Self {
        Self {
            voltage: 4,
            current: 5,
        }
    }
}

/// 设备地址前缀表，启动时加载，之后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddressTable {
    outlet_state: Oid,
    outlet_control: Oid,
    inlet_voltage: Oid,
    outlet_current: Oid,
    sensors: SensorCodes,
}

const PX3_OUTLET_STATE: [u32; 13] = [1, 3, 6, 1, 4, 1, 13742, 6, 4, 1, 2, 1, 3];
const PX3_OUTLET_CONTROL: [u32; 13] = [1, 3, 6, 1, 4, 1, 13742, 6, 4, 1, 2, 1, 2];
const PX3_SENSOR_VALUE: [u32; 13] = [1, 3, 6, 1, 4, 1, 13742, 6, 5, 2, 3, 1, 4];

impl DeviceAddressTable {
    pub fn new(
        outlet_state: Oid,
        outlet_control: Oid,
        inlet_voltage: Oid,
        outlet_current: Oid,
        sensors: SensorCodes,
    ) -> Self {
        Self {
            outlet_state,
            outlet_control,
            inlet_voltage,
            outlet_current,
            sensors,
        }
    }

    /// Raritan PX3（PDU2-MIB）
    pub fn px3() -> Self {
        Self::new(
            Oid::from_static(&PX3_OUTLET_STATE),
            Oid::from_static(&PX3_OUTLET_CONTROL),
            Oid::from_static(&PX3_SENSOR_VALUE),
            Oid::from_static(&PX3_SENSOR_VALUE),
            SensorCodes::default(),
        )
    }

    /// 按型号名选择内置表（大小写不敏感）
    pub fn for_model(model: &str) -> Option<Self> {
        match model.trim().to_ascii_uppercase().as_str() {
            "PX3" => Some(Self::px3()),
            _ => None,
        }
    }

    pub fn prefix(&self, quantity: Quantity) -> &Oid {
        match quantity {
            Quantity::OutletState => &self.outlet_state,
            Quantity::OutletControl => &self.outlet_control,
            Quantity::InletVoltage => &self.inlet_voltage,
            Quantity::OutletCurrent => &self.outlet_current,
        }
    }

    /// 覆盖某个物理量的前缀
    pub fn with_prefix(mut self, quantity: Quantity, prefix: Oid) -> Self {
        match quantity {
            Quantity::OutletState => self.outlet_state = prefix,
            Quantity::OutletControl => self.outlet_control = prefix,
            Quantity::InletVoltage => self.inlet_voltage = prefix,
            Quantity::OutletCurrent => self.outlet_current = prefix,
        }
        self
    }

    pub fn sensors(&self) -> SensorCodes {
        self.sensors
    }

    /// 计算完整 OID。`subtype` 为空时使用表中的传感器编码（对状态 / 控制无效）。
    pub fn address_for(&self, quantity: Quantity, outlet: OutletId, subtype: Option<u32>) -> Oid {
        let prefix = self.prefix(quantity);
        match quantity {
            Quantity::OutletState | Quantity::OutletControl => prefix.child(&[1, outlet.get()]),
            Quantity::InletVoltage => {
                prefix.child(&[1, 1, subtype.unwrap_or(self.sensors.voltage)])
            }
            Quantity::OutletCurrent => {
                prefix.child(&[1, outlet.get(), subtype.unwrap_or(self.sensors.current)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn outlet(n: u32) -> OutletId {
        OutletId::new(n).unwrap()
    }

    #[test]
    fn px3_addresses() {
        let table = DeviceAddressTable::px3();
        assert_eq!(
            table.address_for(Quantity::OutletState, outlet(3), None).to_string(),
            ".1.3.6.1.4.1.13742.6.4.1.2.1.3.1.3"
        );
        assert_eq!(
            table.address_for(Quantity::OutletControl, outlet(3), None).to_string(),
            ".1.3.6.1.4.1.13742.6.4.1.2.1.2.1.3"
        );
        assert_eq!(
            table.address_for(Quantity::InletVoltage, outlet(3), None).to_string(),
            ".1.3.6.1.4.1.13742.6.5.2.3.1.4.1.1.4"
        );
        assert_eq!(
            table.address_for(Quantity::OutletCurrent, outlet(3), None).to_string(),
            ".1.3.6.1.4.1.13742.6.5.2.3.1.4.1.3.5"
        );
    }

    #[test]
    fn explicit_subtype_wins() {
        let table = DeviceAddressTable::px3();
        assert_eq!(
            table.address_for(Quantity::OutletCurrent, outlet(2), Some(9)).to_string(),
            ".1.3.6.1.4.1.13742.6.5.2.3.1.4.1.2.9"
        );
    }

    #[test]
    fn addresses_are_distinct_per_outlet_and_quantity() {
        let table = DeviceAddressTable::px3();
        let mut seen = HashSet::new();
        for n in 1..=48 {
            for quantity in [Quantity::OutletState, Quantity::OutletControl, Quantity::OutletCurrent] {
                let first = table.address_for(quantity, outlet(n), None);
                assert_eq!(first, table.address_for(quantity, outlet(n), None));
                assert!(seen.insert(first), "duplicate address for {:?} {}", quantity, n);
            }
        }
        assert!(seen.insert(table.address_for(Quantity::InletVoltage, outlet(1), None)));
    }

    #[test]
    fn model_lookup_and_override() {
        assert!(DeviceAddressTable::for_model("px3").is_some());
        assert!(DeviceAddressTable::for_model("PX9").is_none());
        let custom: Oid = ".1.3.6.1.4.1.99.1".parse().unwrap();
        let table = DeviceAddressTable::px3().with_prefix(Quantity::OutletState, custom.clone());
        assert_eq!(table.prefix(Quantity::OutletState), &custom);
        assert_eq!(
            table.address_for(Quantity::OutletState, outlet(1), None).to_string(),
            ".1.3.6.1.4.1.99.1.1.1"
        );
    }
}
