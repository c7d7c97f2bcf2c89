use pdu_config::{AppConfig, ConfigError};
use pdu_control::{DeviceAddressTable, Quantity};
use pdu_protocol::SnmpVersion;
use std::collections::HashMap;

fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    AppConfig::from_source(&|key| map.get(key).cloned())
}

#[test]
fn defaults_match_existing_deployments() {
    let config = load(&[]).expect("config");
    assert_eq!(config.http_addr, "0.0.0.0:5000");
    assert_eq!(config.snmp.host, "192.168.1.100");
    assert_eq!(config.snmp.port, 161);
    assert_eq!(config.snmp.community, "public");
    assert_eq!(config.snmp.version, SnmpVersion::V2c);
    assert_eq!(config.outlet_count, 8);
    assert_eq!(config.toggle_settle_ms, 1000);
    assert_eq!(config.cycle_settle_ms, 5000);
    assert_eq!(config.addresses, DeviceAddressTable::px3());
    assert_eq!(config.state_codes.on_secondary, Some(7));
    assert!(config.supabase.is_none());
    assert!(config.agent_id.is_none());
}

#[test]
fn supabase_needs_url_and_key() {
    assert!(matches!(
        load(&[("SUPABASE_URL", "https://x.supabase.co")]),
        Err(ConfigError::Missing(key)) if key == "SUPABASE_SERVICE_KEY"
    ));
    assert!(matches!(
        load(&[("SUPABASE_SERVICE_KEY", "key")]),
        Err(ConfigError::Missing(key)) if key == "SUPABASE_URL"
    ));

    let config = load(&[
        ("SUPABASE_URL", "https://x.supabase.co"),
        ("SUPABASE_SERVICE_KEY", "key"),
        ("AGENT_ID", "agent-1"),
    ])
    .expect("config");
    assert_eq!(config.supabase.map(|s| s.service_key), Some("key".to_string()));
    assert_eq!(config.agent_id.as_deref(), Some("agent-1"));
}

#[test]
fn rejects_invalid_values() {
    assert!(matches!(
        load(&[("PDU_OUTLETS", "0")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_OUTLETS"
    ));
    assert!(matches!(
        load(&[("SNMP_VERSION", "3")]),
        Err(ConfigError::Invalid(key, _)) if key == "SNMP_VERSION"
    ));
    assert!(matches!(
        load(&[("PDU_MODEL", "PX9")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_MODEL"
    ));
    assert!(matches!(
        load(&[("PDU_OID_OUTLET_STATE", "1.3.x")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_OID_OUTLET_STATE"
    ));
    assert!(load(&[("SNMP_PORT", "70000")]).is_err());
}

#[test]
fn rejects_overlapping_state_codes() {
    assert!(matches!(
        load(&[("PDU_STATE_CYCLE", "1")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_STATE_CYCLE"
    ));
    assert!(matches!(
        load(&[("PDU_STATE_CYCLE", "0")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_STATE_CYCLE"
    ));
    assert!(matches!(
        load(&[("PDU_STATE_OFF", "1")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_STATE_OFF"
    ));
    assert!(matches!(
        load(&[("PDU_STATE_ON_SECONDARY", "2")]),
        Err(ConfigError::Invalid(key, _)) if key == "PDU_STATE_ON_SECONDARY"
    ));
    assert!(load(&[("PDU_STATE_ON", "7"), ("PDU_STATE_ON_SECONDARY", "none")]).is_ok());
}

#[test]
fn unknown_model_with_full_overrides() {
    let config = load(&[
        ("PDU_MODEL", "custom"),
        ("PDU_OID_OUTLET_STATE", ".1.3.6.1.4.1.99.1"),
        ("PDU_OID_OUTLET_CONTROL", ".1.3.6.1.4.1.99.2"),
        ("PDU_OID_INLET_VOLTAGE", ".1.3.6.1.4.1.99.3"),
        ("PDU_OID_OUTLET_CURRENT", ".1.3.6.1.4.1.99.4"),
        ("PDU_STATE_ON_SECONDARY", "none"),
        ("PDU_STATE_CYCLE", "3"),
    ])
    .expect("config");
    assert_eq!(
        config.addresses.prefix(Quantity::OutletControl).to_string(),
        ".1.3.6.1.4.1.99.2"
    );
    assert_eq!(config.state_codes.on_secondary, None);
    assert_eq!(config.state_codes.cycle, 3);
}

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("PORT", "5055");
        std::env::set_var("SNMP_COMMUNITY", "private");
    }

    let config = AppConfig::from_env().expect("config");
    assert!(config.http_addr.ends_with(":5055"));
    assert_eq!(config.snmp.community, "private");
}
