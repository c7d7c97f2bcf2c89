use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use domain::{OutletId, OutletReading, OutletState};
use pdu_storage::{
    AgentStatus, ObservationSink, OutletEvent, OutletEventKind, RestObservationSink,
    RestSinkConfig, SinkError,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    query: Option<String>,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct FakeStore {
    captured: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn capture(
    State(store): State<FakeStore>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    store.captured.lock().unwrap().push(Captured {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        apikey: header(&headers, "apikey"),
        authorization: header(&headers, "authorization"),
        prefer: header(&headers, "prefer"),
        body,
    });
    if !store.status.is_success() {
        return (store.status, "{\"message\":\"JWT expired\"}").into_response();
    }
    if method == Method::GET {
        let rows = serde_json::json!([
            {"id": 9, "outlet_id": "2", "state": "on", "voltage": 230.0, "current": 0.8,
             "created_at": "2024-05-01T10:00:00.000Z"},
            {"id": 8, "outlet_id": "2", "state": "off", "voltage": 229.5, "current": 0.0,
             "created_at": "2024-05-01T09:00:00.000Z"}
        ]);
        return axum::Json(rows).into_response();
    }
    StatusCode::CREATED.into_response()
}

async fn spawn_store(status: StatusCode) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(capture).with_state(FakeStore {
        captured: captured.clone(),
        status,
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}", addr), captured)
}

fn sink(url: String, agent_id: Option<&str>) -> RestObservationSink {
    RestObservationSink::new(RestSinkConfig {
        url,
        service_key: "service-key".to_string(),
        agent_id: agent_id.map(str::to_string),
        timeout_ms: 2000,
    })
    .expect("client")
}

#[tokio::test]
async fn posts_reading_with_auth_headers() {
    let (url, captured) = spawn_store(StatusCode::CREATED).await;
    let sink = sink(url, None);
    let id = OutletId::new(2).unwrap();
    let reading = OutletReading {
        id,
        name: id.display_name(),
        state: OutletState::On,
        voltage: 230.0,
        current: 0.8,
        observed_at_ms: 0,
        error: None,
    };
    sink.log_outlet_state(&reading).await.expect("logged");

    let captured = captured.lock().unwrap();
    let request = &captured[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/rest/v1/outlet_readings");
    assert_eq!(request.apikey.as_deref(), Some("service-key"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer service-key"));
    assert_eq!(request.prefer.as_deref(), Some("return=minimal"));
    assert_eq!(request.body["outlet_id"], "2");
    assert_eq!(request.body["state"], "on");
    assert_eq!(request.body["created_at"], "1970-01-01T00:00:00.000Z");
}

#[tokio::test]
async fn posts_event_row() {
    let (url, captured) = spawn_store(StatusCode::CREATED).await;
    let sink = sink(url, None);
    let event = OutletEvent::user(OutletId::new(5).unwrap(), OutletEventKind::Cycle, OutletState::On);
    sink.log_outlet_event(&event).await.expect("logged");

    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].path, "/rest/v1/outlet_events");
    assert_eq!(
        captured[0].body,
        serde_json::json!({"outlet_id": "5", "event_type": "cycle", "new_state": "on", "user_initiated": true})
    );
}

#[tokio::test]
async fn patches_agent_row() {
    let (url, captured) = spawn_store(StatusCode::NO_CONTENT).await;
    let sink = sink(url, Some("agent-7"));
    sink.update_agent_status(AgentStatus::Connected).await.expect("updated");

    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].method, Method::PATCH);
    assert_eq!(captured[0].path, "/rest/v1/agents");
    assert_eq!(captured[0].query.as_deref(), Some("id=eq.agent-7"));
    assert_eq!(captured[0].body["status"], "connected");
}

#[tokio::test]
async fn agent_status_without_id_is_error() {
    let (url, captured) = spawn_store(StatusCode::CREATED).await;
    let sink = sink(url, None);
    let err = sink.update_agent_status(AgentStatus::Connected).await.unwrap_err();
    assert!(matches!(err, SinkError::MissingAgentId));
    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn history_queries_newest_first() {
    let (url, captured) = spawn_store(StatusCode::OK).await;
    let sink = sink(url, None);
    let history = sink
        .get_outlet_history(OutletId::new(2).unwrap(), 50)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].state, "on");

    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].method, Method::GET);
    let query = captured[0].query.clone().unwrap_or_default();
    assert!(query.contains("outlet_id=eq.2"));
    assert!(query.contains("order=created_at.desc"));
    assert!(query.contains("limit=50"));
    assert!(captured[0].prefer.is_none());
}

#[tokio::test]
async fn rejected_write_carries_status() {
    let (url, _captured) = spawn_store(StatusCode::UNAUTHORIZED).await;
    let sink = sink(url, None);
    let event = OutletEvent::user(OutletId::new(1).unwrap(), OutletEventKind::Toggle, OutletState::Off);
    match sink.log_outlet_event(&event).await {
        Err(SinkError::Rejected { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("JWT expired"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
