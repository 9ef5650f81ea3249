/*
[INPUT]:  WebSocket test scenarios against a local server
[OUTPUT]: Test results for the stream session lifecycle
[POS]:    Integration tests - WebSocket
[UPDATE]: When the stream session changes
*/

mod common;

use common::{ServerScript, spawn_delayed_ws_server, spawn_ws_server};
use std::time::Duration;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::Frame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::{Data, OpCode};
use upbit_adapter::{
    ErrorKind, SessionState, StreamConfig, StreamEvent, StreamSession, StreamType,
    SubscriptionRequest,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn test_config(url: &str) -> StreamConfig {
    StreamConfig::new(url).with_keepalive_interval(Duration::from_millis(50))
}

fn subscription() -> String {
    SubscriptionRequest::new()
        .ticket("test-ticket")
        .subscribe(StreamType::Ticker, ["KRW-BTC"])
        .to_json()
}

#[test]
fn test_session_receiver_take_once() {
    let mut session = StreamSession::new(subscription());
    assert!(session.take_receiver().is_some());
    assert!(session.take_receiver().is_none());
}

#[tokio::test]
async fn test_session_delivers_events_in_order() {
    let (url, mut client_frames) = spawn_ws_server(ServerScript::SendThenClose(vec![
        Message::Text(r#"{"type":"ticker","code":"KRW-BTC"}"#.into()),
        Message::Binary(br#"{"type":"trade","code":"KRW-BTC"}"#.to_vec().into()),
        Message::Text("not json".into()),
        Message::Binary(vec![0xff, 0xfe, 0xfd].into()),
    ]))
    .await;

    let request = subscription();
    let mut session = StreamSession::with_config(request.clone(), test_config(&url));
    let mut events = session.take_receiver().expect("receiver");
    let handle = session.handle();

    assert_ok!(timeout(TEST_TIMEOUT, session.start()).await.expect("start timed out"));

    let mut received = Vec::new();
    while let Ok(Some(event)) = timeout(TEST_TIMEOUT, events.recv()).await {
        received.push(event);
    }

    assert_eq!(received.len(), 5, "events: {received:?}");
    assert_eq!(
        received[0],
        StreamEvent::Message(serde_json::json!({"type": "ticker", "code": "KRW-BTC"}))
    );
    assert_eq!(
        received[1],
        StreamEvent::Message(serde_json::json!({"type": "trade", "code": "KRW-BTC"}))
    );
    for event in &received[2..4] {
        match event {
            StreamEvent::Error { kind, .. } => assert_eq!(*kind, ErrorKind::Decode),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
    assert!(received[4].is_closed());

    assert_eq!(handle.state(), SessionState::Closed);
    assert!(!handle.is_running());

    // Exactly one data frame went to the server: the subscription.
    let first = client_frames.recv().await.expect("subscription frame");
    assert_eq!(first, Message::Text(request.into()));
    assert!(client_frames.recv().await.is_none());
}

#[tokio::test]
async fn test_stop_closes_idle_connection() {
    let (url, mut client_frames) = spawn_ws_server(ServerScript::SendThenHold(vec![
        Message::Text(r#"{"type":"ticker"}"#.into()),
    ]))
    .await;

    let mut session = StreamSession::with_config(subscription(), test_config(&url));
    let mut events = session.take_receiver().expect("receiver");
    let handle = session.handle();
    let task = tokio::spawn(async move { session.start().await });

    let first = timeout(TEST_TIMEOUT, events.recv())
        .await
        .expect("first event timed out");
    assert!(matches!(first, Some(StreamEvent::Message(_))));
    assert!(handle.is_running());
    assert_eq!(handle.state(), SessionState::Open);

    handle.stop();
    assert!(!handle.is_running());

    let result = timeout(TEST_TIMEOUT, task)
        .await
        .expect("session did not stop")
        .expect("session task panicked");
    assert_ok!(result);

    let mut rest = Vec::new();
    while let Ok(Some(event)) = timeout(TEST_TIMEOUT, events.recv()).await {
        rest.push(event);
    }
    assert_eq!(rest.last(), Some(&StreamEvent::Closed), "events: {rest:?}");
    assert_eq!(handle.state(), SessionState::Closed);

    assert!(matches!(client_frames.recv().await, Some(Message::Text(_))));
    assert!(client_frames.recv().await.is_none());
}

#[tokio::test]
async fn test_run_dispatches_to_callback() {
    let (url, _client_frames) = spawn_ws_server(ServerScript::SendThenClose(vec![
        Message::Text(r#"{"type":"orderbook","code":"KRW-ETH"}"#.into()),
    ]))
    .await;

    let session = StreamSession::with_config(subscription(), test_config(&url));
    let mut received = Vec::new();
    let result = timeout(TEST_TIMEOUT, session.run(|event| received.push(event)))
        .await
        .expect("run timed out");
    assert_ok!(result);

    assert_eq!(received.len(), 2, "events: {received:?}");
    assert_eq!(received[0], StreamEvent::Message(serde_json::json!({
        "type": "orderbook",
        "code": "KRW-ETH"
    })));
    assert_eq!(received[1], StreamEvent::Closed);
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let (url, _client_frames) = spawn_ws_server(ServerScript::SendThenClose(Vec::new())).await;

    let mut session = StreamSession::with_config(subscription(), test_config(&url));
    let _events = session.take_receiver();
    assert_ok!(timeout(TEST_TIMEOUT, session.start()).await.expect("start timed out"));

    let err = session.start().await.expect_err("second start");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_stop_returns_while_consumer_is_behind() {
    let frames = (0..10)
        .map(|i| Message::Text(format!(r#"{{"type":"ticker","seq":{i}}}"#).into()))
        .collect();
    let (url, _client_frames) = spawn_ws_server(ServerScript::SendThenHold(frames)).await;

    let config = test_config(&url).with_channel_capacity(1);
    let mut session = StreamSession::with_config(subscription(), config);
    let mut events = session.take_receiver().expect("receiver");
    let handle = session.handle();
    let task = tokio::spawn(async move { session.start().await });

    // Nobody reads: the read loop parks on the full channel.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.state(), SessionState::Open);
    handle.stop();

    let result = timeout(TEST_TIMEOUT, task)
        .await
        .expect("stop did not end the session")
        .expect("session task panicked");
    assert_ok!(result);
    assert_eq!(handle.state(), SessionState::Closed);
    assert!(!handle.is_running());

    let mut received = Vec::new();
    while let Ok(Some(event)) = timeout(TEST_TIMEOUT, events.recv()).await {
        received.push(event);
    }
    assert_eq!(received.last(), Some(&StreamEvent::Closed), "events: {received:?}");
    assert_eq!(received.iter().filter(|event| event.is_closed()).count(), 1);
    assert!(received.len() <= 2, "events: {received:?}");
}

#[tokio::test]
async fn test_invalid_utf8_text_frame_ends_session() {
    let bad_text = Frame::message(vec![0xff, 0xfe, 0xfd], OpCode::Data(Data::Text), true);
    let (url, _client_frames) = spawn_ws_server(ServerScript::SendThenHold(vec![
        Message::Frame(bad_text),
        Message::Text(r#"{"after":1}"#.into()),
    ]))
    .await;

    let mut session = StreamSession::with_config(subscription(), test_config(&url));
    let mut events = session.take_receiver().expect("receiver");
    assert_ok!(timeout(TEST_TIMEOUT, session.start()).await.expect("start timed out"));

    let mut received = Vec::new();
    while let Ok(Some(event)) = timeout(TEST_TIMEOUT, events.recv()).await {
        received.push(event);
    }

    assert_eq!(received.len(), 2, "events: {received:?}");
    match &received[0] {
        StreamEvent::Error { kind, .. } => assert_eq!(*kind, ErrorKind::Decode),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert_eq!(received[1], StreamEvent::Closed);
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_stop_while_connecting_skips_subscription() {
    let (url, mut client_frames) = spawn_delayed_ws_server(Duration::from_millis(300)).await;

    let mut session = StreamSession::with_config(subscription(), test_config(&url));
    let mut events = session.take_receiver().expect("receiver");
    let handle = session.handle();
    let task = tokio::spawn(async move { session.start().await });

    timeout(TEST_TIMEOUT, async {
        while handle.state() != SessionState::Connecting {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session never started connecting");

    handle.stop();
    assert_eq!(handle.state(), SessionState::Closing);

    let result = timeout(TEST_TIMEOUT, task)
        .await
        .expect("session did not stop")
        .expect("session task panicked");
    assert_ok!(result);
    assert_eq!(handle.state(), SessionState::Closed);

    let mut received = Vec::new();
    while let Ok(Some(event)) = timeout(TEST_TIMEOUT, events.recv()).await {
        received.push(event);
    }
    assert_eq!(received, vec![StreamEvent::Closed]);

    let mut sent = Vec::new();
    while let Ok(Some(frame)) = timeout(TEST_TIMEOUT, client_frames.recv()).await {
        sent.push(frame);
    }
    assert_eq!(sent.len(), 1, "frames: {sent:?}");
    assert!(matches!(sent[0], Message::Close(_)));
}
