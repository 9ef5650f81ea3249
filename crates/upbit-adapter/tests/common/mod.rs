/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for upbit-adapter tests

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use upbit_adapter::{ClientConfig, Credentials, UpbitClient};
use wiremock::MockServer;

pub const TEST_ACCESS_KEY: &str = "test-access-key";
pub const TEST_SECRET_KEY: &str = "test-secret-key";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_ACCESS_KEY, TEST_SECRET_KEY)
}

/// Authenticated client pointed at the mock server
pub fn signed_client(server: &MockServer) -> UpbitClient {
    UpbitClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .and_then(|client| client.with_credentials(test_credentials()))
        .expect("client init")
}

/// What the stream test server should do after it has read the subscription
#[derive(Debug, Clone)]
pub enum ServerScript {
    /// Send the frames, then a close frame
    SendThenClose(Vec<Message>),
    /// Send the frames, then keep the socket open until the client closes it
    SendThenHold(Vec<Message>),
}

/// Single-connection WebSocket server on an ephemeral port.
///
/// Returns the `ws://` URL and a receiver of every data frame the client sent.
pub async fn spawn_ws_server(script: ServerScript) -> (String, mpsc::UnboundedReceiver<Message>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");

        // The subscription is the first frame on the wire.
        if let Some(Ok(first)) = ws.next().await {
            let _ = frames_tx.send(first);
        }

        let (frames, close) = match script {
            ServerScript::SendThenClose(frames) => (frames, true),
            ServerScript::SendThenHold(frames) => (frames, false),
        };
        for frame in frames {
            if ws.send(frame).await.is_err() {
                return;
            }
        }
        if close {
            let _ = ws.close(None).await;
        }

        while let Some(Ok(frame)) = ws.next().await {
            match frame {
                Message::Text(_) | Message::Binary(_) => {
                    let _ = frames_tx.send(frame);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    (format!("ws://{addr}"), frames_rx)
}

/// Server that accepts TCP at once but finishes the WebSocket handshake after `delay`.
///
/// Every frame the client sends, close frames included, is forwarded.
pub async fn spawn_delayed_ws_server(delay: Duration) -> (String, mpsc::UnboundedReceiver<Message>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(delay).await;
        let Ok(mut ws) = accept_async(stream).await else {
            return;
        };

        while let Some(Ok(frame)) = ws.next().await {
            let is_close = matches!(frame, Message::Close(_));
            let _ = frames_tx.send(frame);
            if is_close {
                break;
            }
        }
    });

    (format!("ws://{addr}"), frames_rx)
}
