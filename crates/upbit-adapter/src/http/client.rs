/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client and JSON responses for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

use crate::auth::Credentials;
use crate::http::{RequestSigner, Result, UpbitError};
use crate::types::Query;

/// Base URL for Upbit REST API
const BASE_URL: &str = "https://api.upbit.com";
const ERROR_BODY_LOG_MAX_BYTES: usize = 2048;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for Upbit API
#[derive(Debug, Clone)]
pub struct UpbitClient {
    http_client: Client,
    base_url: Url,
    signer: Option<RequestSigner>,
}

impl UpbitClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, BASE_URL)
    }

    /// Create a new client against a non-default origin (tests, proxies)
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            signer: None,
        })
    }

    /// Builder form of [`UpbitClient::set_credentials`]
    pub fn with_credentials(mut self, credentials: Credentials) -> Result<Self> {
        self.set_credentials(credentials)?;
        Ok(self)
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) -> Result<()> {
        self.signer = Some(RequestSigner::new(credentials)?);
        Ok(())
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.signer.as_ref().map(RequestSigner::credentials)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL with the canonical query string installed verbatim
    fn endpoint_url(&self, endpoint: &str, query_string: &str) -> Result<Url> {
        let mut url = self.base_url.join(endpoint)?;
        if query_string.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(query_string));
        }
        Ok(url)
    }

    /// Unauthenticated request (Quotation API)
    pub(crate) async fn public_request(
        &self,
        method: Method,
        endpoint: &str,
        query: &Query,
    ) -> Result<serde_json::Value> {
        let query_string = query.to_query_string();
        let url = self.endpoint_url(endpoint, &query_string)?;
        debug!(%method, endpoint, signed = false, "upbit request");

        let builder = self.http_client.request(method.clone(), url);
        self.send_json(builder, &method, endpoint).await
    }

    /// Authenticated request (Exchange API); fails before any I/O without credentials
    pub(crate) async fn private_request(
        &self,
        method: Method,
        endpoint: &str,
        query: &Query,
    ) -> Result<serde_json::Value> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            UpbitError::Configuration(format!(
                "credentials are required for {method} {endpoint}"
            ))
        })?;

        // Hash and URL share the same bytes.
        let query_string = query.to_query_string();
        let authorization = signer.authorization_for(&query_string)?;
        let url = self.endpoint_url(endpoint, &query_string)?;
        debug!(%method, endpoint, signed = true, "upbit request");

        let builder = self
            .http_client
            .request(method.clone(), url)
            .header(AUTHORIZATION, authorization);
        self.send_json(builder, &method, endpoint).await
    }

    /// Send a request and decode a 2xx JSON body; other statuses are logged and returned as `Api` errors
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &Method,
        endpoint: &str,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                %method,
                endpoint,
                status = status.as_u16(),
                body = %truncate_for_log(&body, ERROR_BODY_LOG_MAX_BYTES),
                "upbit request failed"
            );
            return Err(UpbitError::from_response(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Cut `value` to at most `max_len` bytes on a char boundary for log fields
pub(crate) fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}
