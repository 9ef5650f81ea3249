/*
[INPUT]:  Stream configuration and subscription requests
[OUTPUT]: Real-time quotation events
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new stream types or changing connection logic
*/

pub mod client;
pub mod config;
pub mod message;

pub use client::{SessionState, StreamHandle, StreamSession};
pub use config::StreamConfig;
pub use message::{StreamEvent, StreamType, SubscriptionRequest};
