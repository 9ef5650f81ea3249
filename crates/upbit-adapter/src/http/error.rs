/*
[INPUT]:  Error sources (HTTP, API, serialization, token signing, WebSocket)
[OUTPUT]: Structured error types with a failure category and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Coarse failure category, stable across error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Socket-level failure or an unreachable server
    Transport,
    /// The exchange answered with a non-2xx status
    Api,
    /// A body or frame could not be decoded
    Decode,
    /// The client was used without the setup the call requires
    Configuration,
}

/// Main error type for the Upbit adapter
#[derive(Error, Debug)]
pub enum UpbitError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        name: Option<String>,
        message: String,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// JWT encoding or decoding failed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Header value could not be built
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    name: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl UpbitError {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpbitError::Http(_) | UpbitError::WebSocket(_) => ErrorKind::Transport,
            UpbitError::Api { .. } => ErrorKind::Api,
            UpbitError::Serialization(_) | UpbitError::Decode(_) => ErrorKind::Decode,
            UpbitError::Token(_)
            | UpbitError::UrlParse(_)
            | UpbitError::InvalidHeader(_)
            | UpbitError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            UpbitError::Http(_) | UpbitError::WebSocket(_) => true,
            UpbitError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        match self {
            UpbitError::Api { status, name, .. } => {
                *status == 401
                    || name
                        .as_deref()
                        .is_some_and(|name| name.contains("jwt") || name.contains("query_hash"))
            }
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        UpbitError::Api {
            status: status.as_u16(),
            name: None,
            message: message.into(),
        }
    }

    /// Build an API error from a failed response body.
    ///
    /// Upbit reports failures as `{"error": {"name": ..., "message": ...}}`;
    /// any other body is carried verbatim as the message.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => UpbitError::Api {
                status: status.as_u16(),
                name: parsed.error.name.map(|name| match name {
                    serde_json::Value::String(name) => name,
                    other => other.to_string(),
                }),
                message: parsed.error.message.unwrap_or_else(|| body.to_string()),
            },
            Err(_) => UpbitError::api_error(status, body),
        }
    }
}

/// Result type alias for Upbit operations
pub type Result<T> = std::result::Result<T, UpbitError>;
