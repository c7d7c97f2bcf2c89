//! 应用运行配置加载。
//!
//! 变量名沿用现有部署的 `.env`（`SNMP_HOST`、`PDU_OUTLETS`、`SUPABASE_URL` 等）。

use pdu_control::{DeviceAddressTable, Quantity, StateCodes};
use pdu_protocol::{Oid, SnmpTransportConfig, SnmpVersion};
use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// Supabase 连接配置（URL 与 key 同时存在时才启用）。
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub snmp: SnmpTransportConfig,
    pub pdu_model: String,
    pub outlet_count: u32,
    pub toggle_settle_ms: u64,
    pub cycle_settle_ms: u64,
    pub addresses: DeviceAddressTable,
    pub state_codes: StateCodes,
    pub supabase: Option<SupabaseConfig>,
    pub sink_timeout_ms: u64,
    pub agent_id: Option<String>,
}

const OID_OVERRIDES: [(&str, Quantity); 4] = [
    ("PDU_OID_OUTLET_STATE", Quantity::OutletState),
    ("PDU_OID_OUTLET_CONTROL", Quantity::OutletControl),
    ("PDU_OID_INLET_VOLTAGE", Quantity::InletVoltage),
    ("PDU_OID_OUTLET_CURRENT", Quantity::OutletCurrent),
];

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（测试用 map 代替进程环境）。
    pub fn from_source(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source = Source(lookup);
        let host = source.read_or("HOST", "0.0.0.0");
        let port = source.read_u16_with_default("PORT", 5000)?;
        let http_addr = format!("{}:{}", host, port);

        let version = source.read_or("SNMP_VERSION", "2c");
        let snmp = SnmpTransportConfig {
            host: source.read_or("SNMP_HOST", "192.168.1.100"),
            port: source.read_u16_with_default("SNMP_PORT", 161)?,
            community: source.read_or("SNMP_COMMUNITY", "public"),
            version: version
                .parse::<SnmpVersion>()
                .map_err(|_| ConfigError::Invalid("SNMP_VERSION".to_string(), version.clone()))?,
            timeout_ms: source.read_u64_with_default("SNMP_TIMEOUT_MS", 1000)?,
            retries: source.read_u32_with_default("SNMP_RETRIES", 1)?,
        };

        let pdu_model = source.read_or("PDU_MODEL", "PX3");
        let outlet_count = source.read_u32_with_default("PDU_OUTLETS", 8)?;
        if outlet_count == 0 {
            return Err(ConfigError::Invalid(
                "PDU_OUTLETS".to_string(),
                outlet_count.to_string(),
            ));
        }
        let toggle_settle_ms = source.read_u64_with_default("PDU_TOGGLE_SETTLE_MS", 1000)?;
        let cycle_settle_ms = source.read_u64_with_default("PDU_CYCLE_SETTLE_MS", 5000)?;
        let addresses = address_table(&source, &pdu_model)?;

        let defaults = StateCodes::default();
        let state_codes = StateCodes {
            on: source.read_i64_with_default("PDU_STATE_ON", defaults.on)?,
            off: source.read_i64_with_default("PDU_STATE_OFF", defaults.off)?,
            cycle: source.read_i64_with_default("PDU_STATE_CYCLE", defaults.cycle)?,
            on_secondary: match source.read_optional("PDU_STATE_ON_SECONDARY") {
                Some(value) if value.eq_ignore_ascii_case("none") => None,
                Some(value) => Some(value.parse::<i64>().map_err(|_| {
                    ConfigError::Invalid("PDU_STATE_ON_SECONDARY".to_string(), value.clone())
                })?),
                None => defaults.on_secondary,
            },
        };
        validate_state_codes(&state_codes)?;

        let supabase = match (
            source.read_optional("SUPABASE_URL"),
            source.read_optional("SUPABASE_SERVICE_KEY"),
        ) {
            (Some(url), Some(service_key)) => Some(SupabaseConfig { url, service_key }),
            (Some(_), None) => return Err(ConfigError::Missing("SUPABASE_SERVICE_KEY".to_string())),
            (None, Some(_)) => return Err(ConfigError::Missing("SUPABASE_URL".to_string())),
            (None, None) => None,
        };
        let sink_timeout_ms = source.read_u64_with_default("SINK_TIMEOUT_MS", 5000)?;
        let agent_id = source.read_optional("AGENT_ID");

        Ok(Self {
            http_addr,
            snmp,
            pdu_model,
            outlet_count,
            toggle_settle_ms,
            cycle_settle_ms,
            addresses,
            state_codes,
            supabase,
            sink_timeout_ms,
            agent_id,
        })
    }
}

/// 状态码必须两两不同：cycle 是独立的瞬时码，on / off 必须可区分。
fn validate_state_codes(codes: &StateCodes) -> Result<(), ConfigError> {
    let conflicts = [
        ("PDU_STATE_OFF", codes.off == codes.on, codes.off),
        ("PDU_STATE_CYCLE", codes.cycle == codes.on || codes.cycle == codes.off, codes.cycle),
        (
            "PDU_STATE_ON_SECONDARY",
            codes
                .on_secondary
                .is_some_and(|code| code == codes.off || code == codes.cycle),
            codes.on_secondary.unwrap_or_default(),
        ),
    ];
    match conflicts.into_iter().find(|(_, clash, _)| *clash) {
        Some((key, _, value)) => Err(ConfigError::Invalid(key.to_string(), value.to_string())),
        None => Ok(()),
    }
}

/// 内置型号表 + 前缀覆盖。未知型号只有在四个前缀全部覆盖时才可用。
fn address_table(source: &Source<'_>, model: &str) -> Result<DeviceAddressTable, ConfigError> {
    let mut overrides = Vec::new();
    for (key, quantity) in OID_OVERRIDES {
        if let Some(value) = source.read_optional(key) {
            let oid = value
                .parse::<Oid>()
                .map_err(|_| ConfigError::Invalid(key.to_string(), value.clone()))?;
            overrides.push((quantity, oid));
        }
    }
    let base = match DeviceAddressTable::for_model(model) {
        Some(table) => table,
        None if overrides.len() == OID_OVERRIDES.len() => DeviceAddressTable::px3(),
        None => return Err(ConfigError::Invalid("PDU_MODEL".to_string(), model.to_string())),
    };
    Ok(overrides
        .into_iter()
        .fold(base, |table, (quantity, oid)| table.with_prefix(quantity, oid)))
}

struct Source<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Source<'_> {
    fn read_optional(&self, key: &str) -> Option<String> {
        match (self.0)(key) {
            Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => None,
        }
    }

    fn read_or(&self, key: &str, default: &str) -> String {
        self.read_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn read_u16_with_default(&self, key: &str, default: u16) -> Result<u16, ConfigError> {
        let value = match self.read_optional(key) {
            Some(value) => value,
            None => return Ok(default),
        };
        value
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn read_u32_with_default(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        let value = match self.read_optional(key) {
            Some(value) => value,
            None => return Ok(default),
        };
        value
            .parse::<u32>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn read_u64_with_default(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        let value = match self.read_optional(key) {
            Some(value) => value,
            None => return Ok(default),
        };
        value
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn read_i64_with_default(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        let value = match self.read_optional(key) {
            Some(value) => value,
            None => return Ok(default),
        };
        value
            .parse::<i64>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }
}
