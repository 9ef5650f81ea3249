/*
[INPUT]:  Raw WebSocket frame payloads and subscription choices
[OUTPUT]: Tagged StreamEvent values and subscription request JSON
[POS]:    WebSocket layer - message decoding and subscription payloads
[UPDATE]: When adding new stream types or changing the event shape
*/

use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::http::ErrorKind;

/// Event delivered to the stream consumer, in wire order
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Decoded JSON frame
    Message(Value),
    /// Frame or transport failure.
    ///
    /// A frame that is not JSON, or a binary frame that is not UTF-8, is
    /// reported and the session keeps reading. A transport error ends the
    /// session and is followed by `Closed`. That includes a text frame with
    /// invalid UTF-8, which is a protocol violation.
    Error { kind: ErrorKind, detail: String },
    /// The session closed; always the last event
    Closed,
}

impl StreamEvent {
    pub fn error(kind: ErrorKind, detail: impl Into<String>) -> Self {
        StreamEvent::Error {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, StreamEvent::Closed)
    }

    /// Decode a text or binary frame payload as UTF-8 JSON
    pub fn decode(payload: &[u8]) -> Self {
        let text = match std::str::from_utf8(payload) {
            Ok(text) => text,
            Err(err) => {
                return StreamEvent::error(
                    ErrorKind::Decode,
                    format!("frame is not valid UTF-8: {err}"),
                );
            }
        };

        match serde_json::from_str::<Value>(text) {
            Ok(value) => StreamEvent::Message(value),
            Err(err) => StreamEvent::error(ErrorKind::Decode, format!("frame is not JSON: {err}")),
        }
    }
}

/// Quotation stream types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Ticker,
    Trade,
    Orderbook,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct StreamSubscription {
    #[serde(rename = "type")]
    stream_type: StreamType,
    codes: Vec<String>,
    #[serde(rename = "isOnlySnapshot", skip_serializing_if = "Option::is_none")]
    only_snapshot: Option<bool>,
    #[serde(rename = "isOnlyRealtime", skip_serializing_if = "Option::is_none")]
    only_realtime: Option<bool>,
}

/// Builder for the `[{ticket}, {type, codes}, ...]` subscription payload
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    ticket: String,
    streams: Vec<StreamSubscription>,
}

impl SubscriptionRequest {
    /// New request with a random ticket
    pub fn new() -> Self {
        Self {
            ticket: Uuid::new_v4().to_string(),
            streams: Vec::new(),
        }
    }

    pub fn ticket(mut self, ticket: impl Into<String>) -> Self {
        self.ticket = ticket.into();
        self
    }

    /// Subscribe to a stream for the given market codes (e.g. `KRW-BTC`)
    pub fn subscribe<I, S>(mut self, stream_type: StreamType, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams.push(StreamSubscription {
            stream_type,
            codes: codes.into_iter().map(Into::into).collect(),
            only_snapshot: None,
            only_realtime: None,
        });
        self
    }

    /// Restrict the most recently added stream to snapshots
    pub fn only_snapshot(mut self) -> Self {
        if let Some(last) = self.streams.last_mut() {
            last.only_snapshot = Some(true);
        }
        self
    }

    /// Restrict the most recently added stream to realtime updates
    pub fn only_realtime(mut self) -> Self {
        if let Some(last) = self.streams.last_mut() {
            last.only_realtime = Some(true);
        }
        self
    }

    pub fn to_json(&self) -> String {
        let mut frames = Vec::with_capacity(self.streams.len() + 1);
        frames.push(json!({ "ticket": self.ticket }));
        frames.extend(
            self.streams
                .iter()
                .map(|stream| serde_json::to_value(stream).unwrap_or(Value::Null)),
        );
        Value::Array(frames).to_string()
    }
}

impl Default for SubscriptionRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SubscriptionRequest> for String {
    fn from(request: SubscriptionRequest) -> Self {
        request.to_json()
    }
}

impl From<&SubscriptionRequest> for String {
    fn from(request: &SubscriptionRequest) -> Self {
        request.to_json()
    }
}
