//! SNMP v1/v2c 报文 BER 编解码
//!
//! 报文结构：
//!
//! ```text
//! Message ::= SEQUENCE {
//!     version    INTEGER,          -- v1 = 0, v2c = 1
//!     community  OCTET STRING,
//!     pdu        [A0..A3] {
//!         request-id   INTEGER,
//!         error-status INTEGER,
//!         error-index  INTEGER,
//!         varbinds     SEQUENCE OF SEQUENCE { name OID, value ANY }
//!     }
//! }
//! ```
//!
//! 仅支持单字节 tag 与定长长度编码（SNMP 报文不会用到其它形式）。

use crate::error::ProtocolError;
use crate::oid::Oid;
use crate::types::{Pdu, PduType, SnmpMessage, SnmpValue, SnmpVersion, VarBind};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_IP_ADDRESS: u8 = 0x40;
const TAG_COUNTER32: u8 = 0x41;
const TAG_GAUGE32: u8 = 0x42;
const TAG_TIME_TICKS: u8 = 0x43;
const TAG_OPAQUE: u8 = 0x44;
const TAG_COUNTER64: u8 = 0x46;
const TAG_NO_SUCH_OBJECT: u8 = 0x80;
const TAG_NO_SUCH_INSTANCE: u8 = 0x81;
const TAG_END_OF_MIB_VIEW: u8 = 0x82;

/// 编码完整报文
pub fn encode_message(message: &SnmpMessage) -> Bytes {
    let mut body = BytesMut::new();
    put_integer(&mut body, message.version.wire_value());
    put_tlv(&mut body, TAG_OCTET_STRING, &message.community);
    put_pdu(&mut body, &message.pdu);

    let mut out = BytesMut::with_capacity(body.len() + 4);
    put_tlv(&mut out, TAG_SEQUENCE, &body);
    out.freeze()
}

/// 解码完整报文（外层 SEQUENCE 之后的多余字节忽略）
pub fn decode_message(src: &[u8]) -> Result<SnmpMessage, ProtocolError> {
    let mut src = src;
    let mut message = expect_tlv(&mut src, TAG_SEQUENCE)?;

    let version_raw = read_integer(&mut message)?;
    let version = SnmpVersion::from_wire(version_raw)
        .ok_or_else(|| ProtocolError::Decode(format!("unsupported version {}", version_raw)))?;
    let community = Bytes::copy_from_slice(expect_tlv(&mut message, TAG_OCTET_STRING)?);

    let (tag, mut body) = read_tlv(&mut message)?;
    let pdu_type = PduType::from_tag(tag)
        .ok_or_else(|| ProtocolError::Decode(format!("unsupported pdu tag 0x{:02x}", tag)))?;
    let request_id = read_integer(&mut body)?;
    let request_id = i32::try_from(request_id)
        .map_err(|_| ProtocolError::Decode(format!("request id out of range: {}", request_id)))?;
    let error_status = read_integer(&mut body)?;
    let error_index = read_integer(&mut body)?;

    let mut binds = expect_tlv(&mut body, TAG_SEQUENCE)?;
    let mut var_binds = Vec::new();
    while !binds.is_empty() {
        let mut entry = expect_tlv(&mut binds, TAG_SEQUENCE)?;
        let oid = read_oid(&mut entry)?;
        let value = read_value(&mut entry)?;
        var_binds.push(VarBind { oid, value });
    }

    Ok(SnmpMessage {
        version,
        community,
        pdu: Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            var_binds,
        },
    })
}

fn put_pdu(dst: &mut BytesMut, pdu: &Pdu) {
    let mut binds = BytesMut::new();
    for bind in &pdu.var_binds {
        let mut entry = BytesMut::new();
        put_oid(&mut entry, &bind.oid);
        put_value(&mut entry, &bind.value);
        put_tlv(&mut binds, TAG_SEQUENCE, &entry);
    }

    let mut content = BytesMut::new();
    put_integer(&mut content, i64::from(pdu.request_id));
    put_integer(&mut content, pdu.error_status);
    put_integer(&mut content, pdu.error_index);
    put_tlv(&mut content, TAG_SEQUENCE, &binds);
    put_tlv(dst, pdu.pdu_type.tag(), &content);
}

fn put_value(dst: &mut BytesMut, value: &SnmpValue) {
    match value {
        SnmpValue::Integer(v) => put_integer(dst, *v),
        SnmpValue::OctetString(bytes) => put_tlv(dst, TAG_OCTET_STRING, bytes),
        SnmpValue::Empty => put_tlv(dst, TAG_NULL, &[]),
    }
}

fn put_tlv(dst: &mut BytesMut, tag: u8, content: &[u8]) {
    dst.put_u8(tag);
    put_length(dst, content.len());
    dst.put_slice(content);
}

fn put_length(dst: &mut BytesMut, len: usize) {
    if len < 0x80 {
        dst.put_u8(len as u8);
        return;
    }
    let bytes = (len as u32).to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(3);
    dst.put_u8(0x80 | (4 - start) as u8);
    dst.put_slice(&bytes[start..]);
}

fn put_integer(dst: &mut BytesMut, value: i64) {
    put_tlv(dst, TAG_INTEGER, &encode_signed(value));
}

/// 最短补码表示
fn encode_signed(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let head = bytes[start];
        let next_high = bytes[start + 1] & 0x80;
        if (head == 0x00 && next_high == 0) || (head == 0xff && next_high != 0) {
            start += 1;
        } else {
            break;
        }
    }
    bytes[start..].to_vec()
}

fn put_oid(dst: &mut BytesMut, oid: &Oid) {
    let arcs = oid.arcs();
    let mut content = BytesMut::new();
    put_base128(&mut content, u64::from(arcs[0]) * 40 + u64::from(arcs[1]));
    for arc in &arcs[2..] {
        put_base128(&mut content, u64::from(*arc));
    }
    put_tlv(dst, TAG_OID, &content);
}

fn put_base128(dst: &mut BytesMut, value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut rest = value;
    loop {
        groups[count] = (rest & 0x7f) as u8;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for index in (0..count).rev() {
        let mut byte = groups[index];
        if index != 0 {
            byte |= 0x80;
        }
        dst.put_u8(byte);
    }
}

fn read_tlv<'a>(src: &mut &'a [u8]) -> Result<(u8, &'a [u8]), ProtocolError> {
    if src.remaining() < 2 {
        return Err(ProtocolError::Decode("truncated tlv header".to_string()));
    }
    let tag = src.get_u8();
    let len = read_length(src)?;
    if src.remaining() < len {
        return Err(ProtocolError::Decode(format!(
            "truncated value for tag 0x{:02x}: need {}, have {}",
            tag,
            len,
            src.remaining()
        )));
    }
    let current: &'a [u8] = *src;
    let (content, rest) = current.split_at(len);
    *src = rest;
    Ok((tag, content))
}

fn expect_tlv<'a>(src: &mut &'a [u8], expected: u8) -> Result<&'a [u8], ProtocolError> {
    let (tag, content) = read_tlv(src)?;
    if tag != expected {
        return Err(ProtocolError::Decode(format!(
            "expected tag 0x{:02x}, got 0x{:02x}",
            expected, tag
        )));
    }
    Ok(content)
}

fn read_length(src: &mut &[u8]) -> Result<usize, ProtocolError> {
    if !src.has_remaining() {
        return Err(ProtocolError::Decode("missing length".to_string()));
    }
    let first = src.get_u8();
    if first & 0x80 == 0 {
        return Ok(usize::from(first));
    }
    let count = usize::from(first & 0x7f);
    if count == 0 || count > 4 {
        return Err(ProtocolError::Decode(format!(
            "unsupported length form 0x{:02x}",
            first
        )));
    }
    if src.remaining() < count {
        return Err(ProtocolError::Decode("truncated length".to_string()));
    }
    let mut len = 0usize;
    for _ in 0..count {
        len = (len << 8) | usize::from(src.get_u8());
    }
    Ok(len)
}

fn read_integer(src: &mut &[u8]) -> Result<i64, ProtocolError> {
    let content = expect_tlv(src, TAG_INTEGER)?;
    decode_signed(content)
}

fn decode_signed(content: &[u8]) -> Result<i64, ProtocolError> {
    if content.is_empty() || content.len() > 8 {
        return Err(ProtocolError::Decode(format!(
            "invalid integer length {}",
            content.len()
        )));
    }
    let mut value: i64 = if content[0] & 0x80 != 0 { -1 } else { 0 };
    for byte in content {
        value = (value << 8) | i64::from(*byte);
    }
    Ok(value)
}

fn decode_unsigned(content: &[u8]) -> Result<i64, ProtocolError> {
    let too_long = content.len() > 9 || (content.len() == 9 && content[0] != 0);
    if content.is_empty() || too_long {
        return Err(ProtocolError::Decode(format!(
            "invalid unsigned length {}",
            content.len()
        )));
    }
    let mut value: u64 = 0;
    for byte in content {
        value = (value << 8) | u64::from(*byte);
    }
    i64::try_from(value)
        .map_err(|_| ProtocolError::Decode(format!("unsigned value too large: {}", value)))
}

fn read_oid(src: &mut &[u8]) -> Result<Oid, ProtocolError> {
    let content = expect_tlv(src, TAG_OID)?;
    decode_oid(content)
}

fn decode_oid(content: &[u8]) -> Result<Oid, ProtocolError> {
    if content.is_empty() {
        return Err(ProtocolError::Decode("empty oid".to_string()));
    }
    let mut subids = Vec::new();
    let mut value: u64 = 0;
    let mut pending = false;
    for byte in content {
        if value > (u64::MAX >> 7) {
            return Err(ProtocolError::Decode("oid arc overflow".to_string()));
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        pending = true;
        if byte & 0x80 == 0 {
            subids.push(value);
            value = 0;
            pending = false;
        }
    }
    if pending {
        return Err(ProtocolError::Decode("truncated oid arc".to_string()));
    }

    let first = subids[0];
    let (a, b) = match first {
        0..=39 => (0, first),
        40..=79 => (1, first - 40),
        _ => (2, first - 80),
    };
    let mut arcs = Vec::with_capacity(subids.len() + 1);
    arcs.push(a as u32);
    for subid in std::iter::once(b).chain(subids.into_iter().skip(1)) {
        let arc = u32::try_from(subid)
            .map_err(|_| ProtocolError::Decode(format!("oid arc too large: {}", subid)))?;
        arcs.push(arc);
    }
    Oid::from_arcs(arcs).map_err(|err| ProtocolError::Decode(err.to_string()))
}

fn read_value(src: &mut &[u8]) -> Result<SnmpValue, ProtocolError> {
    let (tag, content) = read_tlv(src)?;
    match tag {
        TAG_INTEGER => Ok(SnmpValue::Integer(decode_signed(content)?)),
        TAG_COUNTER32 | TAG_GAUGE32 | TAG_TIME_TICKS | TAG_COUNTER64 => {
            Ok(SnmpValue::Integer(decode_unsigned(content)?))
        }
        TAG_OCTET_STRING | TAG_IP_ADDRESS | TAG_OPAQUE => {
            Ok(SnmpValue::OctetString(Bytes::copy_from_slice(content)))
        }
        TAG_OID => {
            let oid = decode_oid(content)?;
            Ok(SnmpValue::OctetString(Bytes::from(oid.to_string())))
        }
        TAG_NULL | TAG_NO_SUCH_OBJECT | TAG_NO_SUCH_INSTANCE | TAG_END_OF_MIB_VIEW => {
            Ok(SnmpValue::Empty)
        }
        other => Err(ProtocolError::Decode(format!(
            "unsupported value tag 0x{:02x}",
            other
        ))),
    }
}
