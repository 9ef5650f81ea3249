/*
[INPUT]:  Stream URL, keep-alive interval and channel capacity
[OUTPUT]: StreamConfig consumed by StreamSession
[POS]:    WebSocket layer - session configuration
[UPDATE]: When adding stream connection options
*/

use std::time::Duration;

/// Upbit public quotation stream.
pub const DEFAULT_STREAM_URL: &str = "wss://api.upbit.com/websocket/v1";

/// Default keep-alive polling interval in seconds.
pub const DEFAULT_KEEPALIVE_SECS: u64 = 5;

/// Default capacity of the event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Stream session configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket URL.
    pub url: String,

    /// How often the keep-alive loop re-checks the running flag.
    pub keepalive_interval: Duration,

    /// Bound of the event channel; a full channel pauses the read loop.
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STREAM_URL.to_string(),
            keepalive_interval: Duration::from_secs(DEFAULT_KEEPALIVE_SECS),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl StreamConfig {
    /// Creates a configuration for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the keep-alive interval.
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Sets the event channel capacity (minimum 1).
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}
