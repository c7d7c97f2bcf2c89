//! # 协议通信能力模块
//!
//! 通过 SNMP v1/v2c 与 PDU 交互，提供：
//! - **Oid**：对象标识符的解析、拼接与展示
//! - **codec**：GetRequest / SetRequest / Response 报文的 BER 编解码
//! - **SnmpTransport**：单值读写接口，`UdpSnmpTransport` 为 UDP 实现
//!
//! ## 架构设计
//!
//! ```text
//! OutletService (control)
//!       │  get(oid) / set(oid, value)
//!       ▼
//! SnmpTransport
//!       │
//!       └── UdpSnmpTransport ── encode_message ──► UDP ──► PDU
//!                            ◄── decode_message ──
//! ```

pub mod codec;
mod error;
mod oid;
mod transport;
mod types;

pub use bytes::Bytes;
pub use codec::{decode_message, encode_message};
pub use error::ProtocolError;
pub use oid::Oid;
pub use transport::{SnmpTransport, SnmpTransportConfig, UdpSnmpTransport};
pub use types::*;
