use domain::{OutletId, OutletReading, OutletState};
use pdu_storage::{
    AgentStatus, DisconnectedSink, InMemoryObservationSink, ObservationSink, OutletEvent,
    OutletEventKind, SinkError,
};

fn reading(id: u32, state: OutletState, observed_at_ms: i64) -> OutletReading {
    let id = OutletId::new(id).unwrap();
    OutletReading {
        id,
        name: id.display_name(),
        state,
        voltage: 120.0,
        current: 1.5,
        observed_at_ms,
        error: None,
    }
}

#[tokio::test]
async fn history_is_newest_first_and_filtered() {
    let sink = InMemoryObservationSink::new();
    sink.log_outlet_state(&reading(1, OutletState::Off, 1_000)).await.unwrap();
    sink.log_outlet_state(&reading(2, OutletState::On, 2_000)).await.unwrap();
    sink.log_outlet_state(&reading(1, OutletState::On, 3_000)).await.unwrap();
    sink.log_outlet_state(&reading(1, OutletState::Off, 4_000)).await.unwrap();

    let history = sink
        .get_outlet_history(OutletId::new(1).unwrap(), 2)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].state, "off");
    assert_eq!(history[0].created_at, "1970-01-01T00:00:04.000Z");
    assert_eq!(history[1].state, "on");
    assert!(history.iter().all(|record| record.outlet_id == "1"));
}

#[tokio::test]
async fn records_events_and_agent_status() {
    let sink = InMemoryObservationSink::new();
    let id = OutletId::new(3).unwrap();
    sink.log_outlet_event(&OutletEvent::user(id, OutletEventKind::Toggle, OutletState::On))
        .await
        .unwrap();
    sink.update_agent_status(AgentStatus::Connected).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, OutletEventKind::Toggle);
    assert!(events[0].user_initiated);
    assert_eq!(sink.agent_status(), Some(AgentStatus::Connected));
}

#[tokio::test]
async fn failing_sink_rejects_writes() {
    let sink = InMemoryObservationSink::new();
    sink.set_failing(true);
    let err = sink
        .log_outlet_state(&reading(1, OutletState::On, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SinkError::Request(_)));
    assert!(sink.readings().is_empty());
}

#[tokio::test]
async fn disconnected_sink_reports_disconnected() {
    let sink = DisconnectedSink;
    assert!(!sink.is_connected());
    let err = sink
        .get_outlet_history(OutletId::new(1).unwrap(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, SinkError::Disconnected));
}
