/*
[INPUT]:  HTTP client configuration, credentials and API endpoints
[OUTPUT]: HTTP responses as parsed JSON
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod public;
pub mod signature;
pub mod trade;
pub mod wallet;

pub use error::{ErrorKind, Result, UpbitError};
pub use signature::RequestSigner;

pub use client::{ClientConfig, UpbitClient};
