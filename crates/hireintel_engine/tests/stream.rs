use std::sync::{Arc, Mutex};
use std::time::Duration;

use hireintel_engine::{
    run_subscription, EngineEvent, EventSink, FetchSettings, ReconnectPolicy, ReqwestGateway,
    StreamEvent, StreamEventKind,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn kinds(&self) -> Vec<StreamEventKind> {
        self.events
            .lock()
            .unwrap()
            .drain(..)
            .map(|event| match event {
                EngineEvent::Stream(StreamEvent { kind, .. }) => kind,
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn quick_policy(max_retries: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        multiplier: 2.0,
        jitter: 0.0,
        max_retries: Some(max_retries),
    }
}

fn gateway_for(server: &MockServer) -> ReqwestGateway {
    ReqwestGateway::new(FetchSettings {
        base_url: server.uri(),
        ..FetchSettings::default()
    })
    .expect("gateway")
}

#[tokio::test]
async fn delivered_events_become_messages_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/candidates/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: one\n\n: ping\n\ndata: two\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let sink = TestSink::default();
    run_subscription(
        &gateway_for(&server),
        3,
        1,
        &quick_policy(0),
        &sink,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(
        sink.kinds(),
        vec![
            StreamEventKind::Connected,
            StreamEventKind::Message("one".to_string()),
            StreamEventKind::Message("two".to_string()),
            StreamEventKind::GaveUp {
                reason: "network error: stream closed by server".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn failing_endpoint_retries_then_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/candidates/stream"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let sink = TestSink::default();
    run_subscription(
        &gateway_for(&server),
        1,
        1,
        &quick_policy(2),
        &sink,
        CancellationToken::new(),
    )
    .await;

    let kinds = sink.kinds();
    assert_eq!(kinds.len(), 3);
    assert!(matches!(
        kinds[0],
        StreamEventKind::TransportError { attempt: 1, .. }
    ));
    assert!(matches!(
        kinds[1],
        StreamEventKind::TransportError { attempt: 2, .. }
    ));
    assert!(matches!(kinds[2], StreamEventKind::GaveUp { .. }));
}

#[tokio::test]
async fn cancelled_subscription_emits_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/candidates/stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let sink = TestSink::default();
    run_subscription(&gateway_for(&server), 1, 1, &quick_policy(5), &sink, cancel).await;

    assert!(sink.kinds().is_empty());
}

#[tokio::test]
async fn cancelling_during_backoff_stops_the_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/candidates/stream"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let policy = ReconnectPolicy {
        initial_delay: Duration::from_secs(30),
        max_delay: Duration::from_secs(30),
        jitter: 0.0,
        max_retries: None,
        ..ReconnectPolicy::default()
    };
    let cancel = CancellationToken::new();
    let sink = Arc::new(TestSink::default());

    let task = {
        let cancel = cancel.clone();
        let sink = sink.clone();
        let gateway = gateway_for(&server);
        tokio::spawn(async move {
            run_subscription(&gateway, 1, 1, &policy, sink.as_ref(), cancel).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("subscription stopped")
        .expect("task joined");

    let kinds = sink.kinds();
    assert_eq!(kinds.len(), 1);
    assert!(matches!(
        kinds[0],
        StreamEventKind::TransportError { attempt: 1, .. }
    ));
}

#[test]
fn backoff_grows_and_is_capped() {
    let policy = ReconnectPolicy {
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(10),
        multiplier: 2.0,
        jitter: 0.0,
        max_retries: Some(10),
    };

    assert_eq!(policy.base_delay(1, None), Duration::from_secs(1));
    assert_eq!(policy.base_delay(2, None), Duration::from_secs(2));
    assert_eq!(policy.base_delay(3, None), Duration::from_secs(4));
    assert_eq!(policy.base_delay(9, None), Duration::from_secs(10));
    assert_eq!(
        policy.base_delay(1, Some(Duration::from_millis(250))),
        Duration::from_millis(250)
    );
    assert!(!policy.exhausted(10));
    assert!(policy.exhausted(11));
}

#[test]
fn jitter_stays_within_its_fraction() {
    let policy = ReconnectPolicy {
        initial_delay: Duration::from_secs(4),
        max_delay: Duration::from_secs(60),
        multiplier: 2.0,
        jitter: 0.25,
        max_retries: None,
    };

    for _ in 0..100 {
        let delay = policy.delay_for(1, None);
        assert!(delay >= Duration::from_secs(3), "{delay:?}");
        assert!(delay <= Duration::from_secs(5), "{delay:?}");
    }
    assert!(!policy.exhausted(u32::MAX));
}
