use bytes::Bytes;
use pdu_protocol::{
    decode_message, encode_message, Oid, PduType, SnmpMessage, SnmpTransport,
    SnmpTransportConfig, SnmpValue, SnmpVersion, UdpSnmpTransport,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;

type Table = Arc<Mutex<HashMap<Oid, SnmpValue>>>;

/// 本地假 agent：按 community 校验，GET 查表，SET 写表；`read_only` 内的 OID 返回 notWritable。
async fn spawn_agent(community: &'static str, table: Table, read_only: Vec<Oid>) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind agent");
    let port = socket.local_addr().expect("addr").port();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 65_535];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(request) = decode_message(&buf[..len]) else {
                continue;
            };
            if request.community.as_ref() != community.as_bytes() {
                continue;
            }
            let mut pdu = request.pdu.clone();
            pdu.pdu_type = PduType::Response;
            match request.pdu.pdu_type {
                PduType::GetRequest => {
                    let table = table.lock().unwrap();
                    for bind in pdu.var_binds.iter_mut() {
                        bind.value = table.get(&bind.oid).cloned().unwrap_or(SnmpValue::Empty);
                    }
                }
                PduType::SetRequest => {
                    let oid = pdu.var_binds[0].oid.clone();
                    if read_only.contains(&oid) {
                        pdu.error_status = 17;
                        pdu.error_index = 1;
                    } else {
                        table
                            .lock()
                            .unwrap()
                            .insert(oid, pdu.var_binds[0].value.clone());
                    }
                }
                _ => continue,
            }
            let response = SnmpMessage {
                version: request.version,
                community: request.community.clone(),
                pdu,
            };
            let _ = socket.send_to(&encode_message(&response), peer).await;
        }
    });
    port
}

/// 应答前先发出的干扰报文
#[derive(Clone, Copy)]
enum Noise {
    Garbage,
    StaleRequestId,
}

/// 本地假 agent：对每个 GET 先发送干扰报文，再回复 `Integer(1)`。
async fn spawn_noisy_agent(noise: Noise) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind agent");
    let port = socket.local_addr().expect("addr").port();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 65_535];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(request) = decode_message(&buf[..len]) else {
                continue;
            };
            let mut pdu = request.pdu.clone();
            pdu.pdu_type = PduType::Response;
            pdu.var_binds[0].value = SnmpValue::Integer(1);
            let reply = SnmpMessage {
                version: request.version,
                community: request.community.clone(),
                pdu,
            };

            match noise {
                Noise::Garbage => {
                    let _ = socket.send_to(b"garbage", peer).await;
                }
                Noise::StaleRequestId => {
                    let mut stale = reply.clone();
                    stale.pdu.request_id = stale.pdu.request_id.wrapping_sub(1);
                    stale.pdu.var_binds[0].value = SnmpValue::Integer(0);
                    let _ = socket.send_to(&encode_message(&stale), peer).await;
                }
            }
            let _ = socket.send_to(&encode_message(&reply), peer).await;
        }
    });
    port
}

fn transport(port: u16, community: &str) -> UdpSnmpTransport {
    UdpSnmpTransport::new(SnmpTransportConfig {
        host: "127.0.0.1".to_string(),
        port,
        community: community.to_string(),
        version: SnmpVersion::V2c,
        timeout_ms: 200,
        retries: 0,
    })
}

fn oid(text: &str) -> Oid {
    text.parse().unwrap()
}

#[tokio::test]
async fn get_returns_agent_value() {
    let state_oid = oid(".1.3.6.1.4.1.13742.6.4.1.2.1.3.1.1");
    let table: Table = Arc::new(Mutex::new(HashMap::new()));
    table
        .lock()
        .unwrap()
        .insert(state_oid.clone(), SnmpValue::Integer(7));
    let port = spawn_agent("public", table, Vec::new()).await;

    let transport = transport(port, "public");
    assert_eq!(transport.get(&state_oid).await, SnmpValue::Integer(7));
}

#[tokio::test]
async fn get_missing_instance_is_empty() {
    let table: Table = Arc::new(Mutex::new(HashMap::new()));
    let port = spawn_agent("public", table, Vec::new()).await;

    let transport = transport(port, "public");
    let value = transport.get(&oid(".1.3.6.1.4.1.13742.6.5.2.3.1.4.1.1.4")).await;
    assert_eq!(value, SnmpValue::Empty);
}

#[tokio::test]
async fn set_writes_value() {
    let control_oid = oid(".1.3.6.1.4.1.13742.6.4.1.2.1.2.1.3");
    let table: Table = Arc::new(Mutex::new(HashMap::new()));
    let port = spawn_agent("private", table.clone(), Vec::new()).await;

    let transport = transport(port, "private");
    assert!(transport.set(&control_oid, SnmpValue::Integer(2)).await);
    assert_eq!(
        table.lock().unwrap().get(&control_oid),
        Some(&SnmpValue::Integer(2))
    );
}

#[tokio::test]
async fn set_error_status_is_false() {
    let control_oid = oid(".1.3.6.1.4.1.13742.6.4.1.2.1.2.1.4");
    let table: Table = Arc::new(Mutex::new(HashMap::new()));
    let port = spawn_agent("private", table.clone(), vec![control_oid.clone()]).await;

    let transport = transport(port, "private");
    assert!(!transport.set(&control_oid, SnmpValue::Integer(1)).await);
    assert!(table.lock().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_community_times_out_to_empty() {
    let table: Table = Arc::new(Mutex::new(HashMap::new()));
    table
        .lock()
        .unwrap()
        .insert(oid("1.3.6.1.2.1.1.5.0"), SnmpValue::OctetString(Bytes::from_static(b"pdu-1")));
    let port = spawn_agent("secret", table, Vec::new()).await;

    let transport = transport(port, "public");
    assert_eq!(transport.get(&oid("1.3.6.1.2.1.1.5.0")).await, SnmpValue::Empty);
    assert!(!transport.set(&oid("1.3.6.1.2.1.1.5.0"), SnmpValue::Integer(1)).await);
}

#[tokio::test]
async fn unresolvable_host_is_empty() {
    let transport = UdpSnmpTransport::new(SnmpTransportConfig {
        host: "pdu.invalid".to_string(),
        timeout_ms: 100,
        retries: 0,
        ..SnmpTransportConfig::default()
    });
    assert_eq!(transport.get(&oid("1.3.6.1.2.1.1.5.0")).await, SnmpValue::Empty);
}

#[tokio::test]
async fn corrupt_datagram_is_skipped_until_reply() {
    let port = spawn_noisy_agent(Noise::Garbage).await;
    let transport = UdpSnmpTransport::new(SnmpTransportConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_ms: 500,
        retries: 0,
        ..SnmpTransportConfig::default()
    });
    let value = transport.get(&oid(".1.3.6.1.4.1.13742.6.4.1.2.1.3.1.1")).await;
    assert_eq!(value, SnmpValue::Integer(1));
}

#[tokio::test]
async fn stale_request_id_is_skipped_until_reply() {
    let port = spawn_noisy_agent(Noise::StaleRequestId).await;
    let transport = UdpSnmpTransport::new(SnmpTransportConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_ms: 500,
        retries: 0,
        ..SnmpTransportConfig::default()
    });
    let value = transport.get(&oid(".1.3.6.1.4.1.13742.6.4.1.2.1.3.1.1")).await;
    assert_eq!(value, SnmpValue::Integer(1));
}
