//! 协议相关类型定义

use crate::error::ProtocolError;
use crate::oid::Oid;
use bytes::Bytes;
use std::str::FromStr;

/// SNMP 版本（报文中的 version 字段：v1 = 0，v2c = 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpVersion {
    V1,
    V2c,
}

impl SnmpVersion {
    pub fn wire_value(self) -> i64 {
        match self {
            Self::V1 => 0,
            Self::V2c => 1,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::V1),
            1 => Some(Self::V2c),
            _ => None,
        }
    }
}

impl Default for SnmpVersion {
    fn default() -> Self {
        Self::V2c
    }
}

impl FromStr for SnmpVersion {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "v1" => Ok(Self::V1),
            "2c" | "v2c" | "2" => Ok(Self::V2c),
            other => Err(ProtocolError::ConfigParse(format!(
                "unsupported snmp version: {}",
                other
            ))),
        }
    }
}

/// 设备返回值的封闭变体
///
/// - 各类整数（INTEGER / Counter32 / Gauge32 / TimeTicks / Counter64）→ `Integer`
/// - 字节类（OCTET STRING / IpAddress / Opaque / OID 值）→ `OctetString`
/// - NULL 与 noSuchObject / noSuchInstance / endOfMibView → `Empty`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Bytes),
    Empty,
}

impl SnmpValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// 按整数解释（字符串形式的数字也接受）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::OctetString(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
            Self::Empty => None,
        }
    }

    /// 按数值解释（传感器读数）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::OctetString(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
            Self::Empty => None,
        }
    }
}

/// PDU 类型（上下文标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    GetRequest,
    Response,
    SetRequest,
}

impl PduType {
    pub fn tag(self) -> u8 {
        match self {
            Self::GetRequest => 0xA0,
            Self::Response => 0xA2,
            Self::SetRequest => 0xA3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0xA0 => Some(Self::GetRequest),
            0xA2 => Some(Self::Response),
            0xA3 => Some(Self::SetRequest),
            _ => None,
        }
    }
}

/// 变量绑定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: SnmpValue,
}

/// PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    pub error_status: i64,
    pub error_index: i64,
    pub var_binds: Vec<VarBind>,
}

impl Pdu {
    /// 单变量请求（GET 时 value 为 Empty，编码为 NULL）
    pub fn request(pdu_type: PduType, request_id: i32, oid: Oid, value: SnmpValue) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            var_binds: vec![VarBind { oid, value }],
        }
    }

    /// error-index 指向的 OID（1 基），用于诊断
    pub fn offending_oid(&self) -> Option<&Oid> {
        let index = usize::try_from(self.error_index).ok()?;
        if index == 0 {
            return None;
        }
        self.var_binds.get(index - 1).map(|bind| &bind.oid)
    }
}

/// 完整 SNMP 报文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpMessage {
    pub version: SnmpVersion,
    pub community: Bytes,
    pub pdu: Pdu,
}

/// error-status 名称（RFC 3416）
pub fn error_status_name(status: i64) -> &'static str {
    match status {
        0 => "noError",
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        6 => "noAccess",
        7 => "wrongType",
        8 => "wrongLength",
        9 => "wrongEncoding",
        10 => "wrongValue",
        11 => "noCreation",
        12 => "inconsistentValue",
        13 => "resourceUnavailable",
        14 => "commitFailed",
        15 => "undoFailed",
        16 => "authorizationError",
        17 => "notWritable",
        18 => "inconsistentName",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_config_strings() {
        assert_eq!("2c".parse::<SnmpVersion>().unwrap(), SnmpVersion::V2c);
        assert_eq!("1".parse::<SnmpVersion>().unwrap(), SnmpVersion::V1);
        assert!("3".parse::<SnmpVersion>().is_err());
    }

    #[test]
    fn value_numeric_views() {
        assert_eq!(SnmpValue::Integer(7).as_i64(), Some(7));
        assert_eq!(SnmpValue::OctetString(Bytes::from_static(b" 230.5 ")).as_f64(), Some(230.5));
        assert_eq!(SnmpValue::OctetString(Bytes::from_static(b"on")).as_i64(), None);
        assert_eq!(SnmpValue::Empty.as_f64(), None);
    }

    #[test]
    fn only_get_set_and_response_tags_are_known() {
        assert_eq!(PduType::from_tag(0xA0), Some(PduType::GetRequest));
        assert_eq!(PduType::from_tag(0xA2), Some(PduType::Response));
        assert_eq!(PduType::from_tag(0xA3), Some(PduType::SetRequest));
        assert_eq!(PduType::from_tag(0xA1), None);
    }

    #[test]
    fn offending_oid_uses_one_based_index() {
        let oid: Oid = "1.3.6.1.2.1.1.1.0".parse().unwrap();
        let mut pdu = Pdu::request(PduType::Response, 1, oid.clone(), SnmpValue::Empty);
        assert!(pdu.offending_oid().is_none());
        pdu.error_index = 1;
        assert_eq!(pdu.offending_oid(), Some(&oid));
        pdu.error_index = 2;
        assert!(pdu.offending_oid().is_none());
    }
}
