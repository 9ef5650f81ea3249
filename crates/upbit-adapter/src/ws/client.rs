/*
[INPUT]:  Subscription request payload and stream configuration
[OUTPUT]: Decoded stream events via a bounded channel (or a callback)
[POS]:    WebSocket layer - session lifecycle, read loop and keep-alive loop
[UPDATE]: When changing connection lifecycle or shutdown behavior
*/

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::http::client::truncate_for_log;
use crate::http::{ErrorKind, Result, UpbitError};
use crate::ws::{StreamConfig, StreamEvent};

const MESSAGE_SAMPLE_LIMIT: usize = 3;
const DECODE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static MESSAGE_SAMPLE_COUNT: AtomicUsize = AtomicUsize::new(0);
static DECODE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

/// Lifecycle of one stream session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl SessionState {
    fn as_u8(self) -> u8 {
        match self {
            SessionState::Idle => 0,
            SessionState::Connecting => 1,
            SessionState::Open => 2,
            SessionState::Closing => 3,
            SessionState::Closed => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Idle,
            1 => SessionState::Connecting,
            2 => SessionState::Open,
            3 => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }
}

/// State shared by the read loop, the keep-alive task and every handle.
///
/// `running` uses SeqCst loads/stores so a store from the read loop or from
/// `stop()` is visible to the keep-alive task on its next wake.
#[derive(Debug)]
struct SessionShared {
    running: AtomicBool,
    state: AtomicU8,
    stop_signal: Notify,
    loop_exited: Notify,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            state: AtomicU8::new(SessionState::Idle.as_u8()),
            stop_signal: Notify::new(),
            loop_exited: Notify::new(),
        }
    }

    fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }
}

/// Cloneable control surface of a [`StreamSession`]
#[derive(Debug, Clone)]
pub struct StreamHandle {
    shared: Arc<SessionShared>,
}

impl StreamHandle {
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Stop the session: clear `running` and actively close the socket.
    ///
    /// Stopping an idle session marks it closed; a later `start()` fails.
    pub fn stop(&self) {
        self.shared.set_running(false);
        if self.shared.transition(SessionState::Idle, SessionState::Closed) {
            debug!("stream session stopped before start");
            return;
        }
        if !self
            .shared
            .transition(SessionState::Connecting, SessionState::Closing)
        {
            let _ = self
                .shared
                .transition(SessionState::Open, SessionState::Closing);
        }
        self.shared.stop_signal.notify_one();
    }
}

/// One WebSocket connection to the quotation stream
#[derive(Debug)]
pub struct StreamSession {
    request: String,
    config: StreamConfig,
    shared: Arc<SessionShared>,
    event_tx: Option<mpsc::Sender<StreamEvent>>,
    event_rx: Option<mpsc::Receiver<StreamEvent>>,
}

impl StreamSession {
    /// Create an idle session against the default Upbit stream
    pub fn new(request: impl Into<String>) -> Self {
        Self::with_config(request, StreamConfig::default())
    }

    /// Create an idle session with custom configuration
    pub fn with_config(request: impl Into<String>, config: StreamConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        Self {
            request: request.into(),
            config,
            shared: Arc::new(SessionShared::new()),
            event_tx: Some(tx),
            event_rx: Some(rx),
        }
    }

    /// Get the event receiver
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<StreamEvent>> {
        self.event_rx.take()
    }

    pub fn handle(&self) -> StreamHandle {
        StreamHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Connect, send the subscription once, then forward frames until the socket closes.
    ///
    /// The returned future occupies the calling task for the whole session;
    /// spawn it to run in the background. Resolves once the session is `Closed`.
    pub async fn start(&mut self) -> Result<()> {
        let event_tx = self.event_tx.take().ok_or_else(|| {
            UpbitError::Configuration("stream session already started".to_string())
        })?;
        if !self
            .shared
            .transition(SessionState::Idle, SessionState::Connecting)
        {
            return Err(UpbitError::Configuration(format!(
                "stream session cannot start from state {:?}",
                self.shared.state()
            )));
        }

        info!(url = %self.config.url, "connecting upbit stream");
        let ws_stream = match connect_async(self.config.url.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(err) => {
                self.shared.set_state(SessionState::Closed);
                return Err(UpbitError::WebSocket(err.to_string()));
            }
        };
        let (mut write, mut read) = ws_stream.split();

        self.shared.set_running(true);
        if !self
            .shared
            .transition(SessionState::Connecting, SessionState::Open)
        {
            // stop() raced the handshake
            debug!("stream stopped while connecting");
            self.shared.set_running(false);
            let _ = write.send(WsMessage::Close(None)).await;
            let _ = write.close().await;
            self.shared.set_state(SessionState::Closed);
            emit_closed(event_tx);
            return Ok(());
        }

        if let Err(err) = write
            .send(WsMessage::Text(self.request.clone().into()))
            .await
        {
            warn!(error = %err, "stream subscription send failed");
            self.shared.set_running(false);
            self.shared.set_state(SessionState::Closed);
            let _ = event_tx.try_send(StreamEvent::error(ErrorKind::Transport, err.to_string()));
            emit_closed(event_tx);
            return Err(UpbitError::WebSocket(err.to_string()));
        }
        info!(bytes = self.request.len(), "upbit stream open, subscription sent");

        let sink = Arc::new(Mutex::new(Some(write)));
        let keepalive = spawn_keepalive(
            self.shared.clone(),
            sink.clone(),
            self.config.keepalive_interval,
        );

        loop {
            tokio::select! {
                _ = self.shared.stop_signal.notified() => {
                    debug!("stream stop requested");
                    close_sink(&sink).await;
                    break;
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(WsMessage::Close(frame))) => {
                            debug!(?frame, "stream closed by server");
                            break;
                        }
                        Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                        Some(Ok(WsMessage::Text(text))) => {
                            let event = decode_logged(text.as_str().as_bytes());
                            if !self.forward(&event_tx, &sink, event).await {
                                break;
                            }
                        }
                        Some(Ok(WsMessage::Binary(bytes))) => {
                            let event = decode_logged(&bytes);
                            if !self.forward(&event_tx, &sink, event).await {
                                break;
                            }
                        }
                        Some(Err(err)) => {
                            // The transport yields nothing after an error, including a
                            // text frame that is not valid UTF-8.
                            warn!(error = %err, "stream transport error");
                            let event = StreamEvent::error(error_kind(&err), err.to_string());
                            let _ = self.forward(&event_tx, &sink, event).await;
                            break;
                        }
                        None => {
                            debug!("stream ended without close frame");
                            break;
                        }
                    }
                }
            }
        }

        self.shared.set_running(false);
        let _ = self
            .shared
            .transition(SessionState::Open, SessionState::Closing);
        self.shared.loop_exited.notify_one();

        if let Err(err) = keepalive.await {
            warn!(error = %err, "stream keep-alive task failed");
        }
        close_sink(&sink).await;
        self.shared.set_state(SessionState::Closed);
        emit_closed(event_tx);
        info!("upbit stream closed");
        Ok(())
    }

    /// Deliver one event unless the consumer is gone or `stop()` fires while the channel is full.
    ///
    /// Returns false when the read loop must exit; the socket is already closed then.
    async fn forward(
        &self,
        event_tx: &mpsc::Sender<StreamEvent>,
        sink: &Mutex<Option<WsSink>>,
        event: StreamEvent,
    ) -> bool {
        tokio::select! {
            sent = event_tx.send(event) => {
                if sent.is_ok() {
                    return true;
                }
                debug!("stream consumer dropped");
            }
            _ = self.shared.stop_signal.notified() => {
                debug!("stream stop requested while consumer is behind");
            }
        }
        close_sink(sink).await;
        false
    }

    /// Run the session and hand every event to `callback` on the calling task
    pub async fn run<F>(mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(StreamEvent),
    {
        let mut receiver = self.take_receiver().ok_or_else(|| {
            UpbitError::Configuration("stream receiver already taken".to_string())
        })?;

        let dispatch = async move {
            while let Some(event) = receiver.recv().await {
                callback(event);
            }
        };

        let (result, ()) = tokio::join!(self.start(), dispatch);
        result
    }
}

/// Poll `running` every `interval`; once it is false, close the socket and exit.
///
/// The only frame this task ever sends is the close frame. The session state
/// is left to the read loop, which marks it `Closed` on exit.
fn spawn_keepalive(
    shared: Arc<SessionShared>,
    sink: Arc<Mutex<Option<WsSink>>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shared.loop_exited.notified() => {}
            }
            if !shared.is_running() {
                break;
            }
        }

        close_sink(&sink).await;
        debug!("stream keep-alive finished");
    })
}

async fn close_sink(sink: &Mutex<Option<WsSink>>) {
    let mut guard = sink.lock().await;
    if let Some(mut write) = guard.take() {
        let _ = write.send(WsMessage::Close(None)).await;
        let _ = write.close().await;
    }
}

/// Queue the final `Closed` event without waiting on a consumer that stopped reading.
///
/// With a full channel the event is handed to a task that delivers it after the
/// queued events, so `Closed` stays last.
fn emit_closed(event_tx: mpsc::Sender<StreamEvent>) {
    match event_tx.try_send(StreamEvent::Closed) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(event)) => {
            tokio::spawn(async move {
                let _ = event_tx.send(event).await;
            });
        }
    }
}

fn error_kind(err: &WsError) -> ErrorKind {
    match err {
        WsError::Utf8 { .. } => ErrorKind::Decode,
        _ => ErrorKind::Transport,
    }
}

fn decode_logged(payload: &[u8]) -> StreamEvent {
    let event = StreamEvent::decode(payload);
    match &event {
        StreamEvent::Message(value) => log_message_sample_once(value),
        StreamEvent::Error { detail, .. } => log_decode_fail_once(detail, payload),
        StreamEvent::Closed => {}
    }
    event
}

fn log_message_sample_once(message: &serde_json::Value) {
    let count = MESSAGE_SAMPLE_COUNT.fetch_add(1, Ordering::Relaxed);
    if count >= MESSAGE_SAMPLE_LIMIT {
        return;
    }

    let stream_type = message
        .get("type")
        .or_else(|| message.get("ty"))
        .and_then(|value| value.as_str())
        .unwrap_or("unknown");
    let code = message
        .get("code")
        .or_else(|| message.get("cd"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    info!(
        sample_index = count + 1,
        sample_limit = MESSAGE_SAMPLE_LIMIT,
        stream_type,
        code,
        "ws message sample"
    );
}

fn log_decode_fail_once(detail: &str, raw: &[u8]) {
    let count = DECODE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < DECODE_FAIL_LOG_LIMIT {
        warn!(
            sample_index = count + 1,
            sample_limit = DECODE_FAIL_LOG_LIMIT,
            error = detail,
            bytes = raw.len(),
            "ws message decode failed"
        );
        let preview = truncate_for_log(&String::from_utf8_lossy(raw), RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = DECODE_FAIL_LOG_LIMIT,
            bytes = raw.len(),
            message = %preview,
            "ws message decode failed"
        );
    }
}
