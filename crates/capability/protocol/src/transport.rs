//! SNMP UDP 传输
//!
//! 每次调用独立建立一个 UDP 会话，只发出一个请求并在限定时间内等待一个响应。
//! 网络不可达、超时、报文损坏、设备返回错误状态均在此边界折叠为 `SnmpValue::Empty` / `false`，
//! 不会向上层抛错。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let transport = UdpSnmpTransport::new(SnmpTransportConfig {
//!     host: "192.168.1.100".to_string(),
//!     ..SnmpTransportConfig::default()
//! });
//! let value = transport.get(&".1.3.6.1.4.1.13742.6.4.1.2.1.3.1.1".parse()?).await;
//! ```

use crate::codec::{decode_message, encode_message};
use crate::error::ProtocolError;
use crate::oid::Oid;
use crate::types::{error_status_name, Pdu, PduType, SnmpMessage, SnmpValue, SnmpVersion};
use async_trait::async_trait;
use bytes::Bytes;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// 单值读写接口
///
/// 失败语义：读失败返回 `SnmpValue::Empty`，写失败返回 `false`。
#[async_trait]
pub trait SnmpTransport: Send + Sync {
    async fn get(&self, oid: &Oid) -> SnmpValue;
    async fn set(&self, oid: &Oid, value: SnmpValue) -> bool;
}

/// SNMP 传输配置
#[derive(Debug, Clone)]
pub struct SnmpTransportConfig {
    /// 设备主机地址
    pub host: String,
    /// 设备端口（默认 161）
    pub port: u16,
    /// community 字符串
    pub community: String,
    /// 协议版本（"1" / "2c"）
    pub version: SnmpVersion,
    /// 单次等待响应的超时（毫秒）
    pub timeout_ms: u64,
    /// 超时后的重发次数
    pub retries: u32,
}

impl Default for SnmpTransportConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 161,
            community: "public".to_string(),
            version: SnmpVersion::default(),
            timeout_ms: 1000,
            retries: 1,
        }
    }
}

/// 基于 UDP 的 SNMP 传输
pub struct UdpSnmpTransport {
    config: SnmpTransportConfig,
    next_request_id: AtomicI32,
}

impl UdpSnmpTransport {
    /// 创建新的 UDP 传输
    pub fn new(config: SnmpTransportConfig) -> Self {
        let seed = (now_epoch_ms() & 0x3fff_ffff) as i32;
        Self {
            config,
            next_request_id: AtomicI32::new(seed),
        }
    }

    pub fn config(&self) -> &SnmpTransportConfig {
        &self.config
    }

    fn next_request_id(&self) -> i32 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed) & 0x7fff_ffff
    }

    /// 发送一个单变量请求并等待匹配 request-id 的响应
    async fn exchange(
        &self,
        pdu_type: PduType,
        oid: &Oid,
        value: SnmpValue,
    ) -> Result<Pdu, ProtocolError> {
        let addr = tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| ProtocolError::Connection(format!("resolve {}: {}", self.config.host, e)))?
            .next()
            .ok_or_else(|| {
                ProtocolError::Connection(format!("no address for {}", self.config.host))
            })?;
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(addr).await?;

        let request_id = self.next_request_id();
        let request = SnmpMessage {
            version: self.config.version,
            community: Bytes::from(self.config.community.clone().into_bytes()),
            pdu: Pdu::request(pdu_type, request_id, oid.clone(), value),
        };
        let frame = encode_message(&request);
        let wait = Duration::from_millis(self.config.timeout_ms);
        let mut buf = vec![0u8; 65_535];

        let mut last_decode_error = None;
        for attempt in 0..=self.config.retries {
            socket.send(&frame).await?;
            let deadline = tokio::time::Instant::now() + wait;
            loop {
                let received = match tokio::time::timeout_at(deadline, socket.recv(&mut buf)).await
                {
                    Ok(result) => result?,
                    Err(_) => break,
                };
                // 损坏报文与过期响应一样丢弃，继续等待本次请求的响应
                let response = match decode_message(&buf[..received]) {
                    Ok(response) => response,
                    Err(err) => {
                        debug!(target: "pdu.protocol", oid = %oid, error = %err, "snmp_datagram_dropped");
                        last_decode_error = Some(err);
                        continue;
                    }
                };
                if response.pdu.pdu_type == PduType::Response
                    && response.pdu.request_id == request_id
                {
                    return Ok(response.pdu);
                }
                debug!(
                    target: "pdu.protocol",
                    expected = request_id,
                    received = response.pdu.request_id,
                    "snmp_response_skipped"
                );
            }
            debug!(target: "pdu.protocol", oid = %oid, attempt = attempt, "snmp_request_timeout");
        }

        let detail = last_decode_error
            .map(|err| format!(" (last dropped datagram: {})", err))
            .unwrap_or_default();
        Err(ProtocolError::Timeout(format!(
            "no response from {} for {} after {} attempt(s){}",
            addr,
            oid,
            self.config.retries + 1,
            detail
        )))
    }
}

fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// 检查响应中的 error-status，非零时附带出错 OID
fn check_error_status(pdu: Pdu) -> Result<Pdu, ProtocolError> {
    if pdu.error_status == 0 {
        return Ok(pdu);
    }
    let oid = pdu
        .offending_oid()
        .map(|oid| oid.to_string())
        .unwrap_or_else(|| "?".to_string());
    Err(ProtocolError::ErrorStatus {
        status: pdu.error_status,
        name: error_status_name(pdu.error_status),
        oid,
    })
}

#[async_trait]
impl SnmpTransport for UdpSnmpTransport {
    async fn get(&self, oid: &Oid) -> SnmpValue {
        let started = Instant::now();
        let result = self
            .exchange(PduType::GetRequest, oid, SnmpValue::Empty)
            .await
            .and_then(check_error_status);
        pdu_telemetry::record_snmp_latency_ms(started.elapsed().as_millis() as u64);
        pdu_telemetry::record_snmp_get(result.is_ok());
        match result {
            Ok(pdu) => {
                let value = pdu
                    .var_binds
                    .into_iter()
                    .next()
                    .map(|bind| bind.value)
                    .unwrap_or(SnmpValue::Empty);
                debug!(target: "pdu.protocol", oid = %oid, value = ?value, "snmp_get");
                value
            }
            Err(err) => {
                warn!(target: "pdu.protocol", oid = %oid, error = %err, "snmp_get_failed");
                SnmpValue::Empty
            }
        }
    }

    async fn set(&self, oid: &Oid, value: SnmpValue) -> bool {
        let started = Instant::now();
        let result = self
            .exchange(PduType::SetRequest, oid, value.clone())
            .await
            .and_then(check_error_status);
        pdu_telemetry::record_snmp_latency_ms(started.elapsed().as_millis() as u64);
        pdu_telemetry::record_snmp_set(result.is_ok());
        match result {
            Ok(_) => {
                debug!(target: "pdu.protocol", oid = %oid, value = ?value, "snmp_set");
                true
            }
            Err(err) => {
                warn!(target: "pdu.protocol", oid = %oid, error = %err, "snmp_set_failed");
                false
            }
        }
    }
}
