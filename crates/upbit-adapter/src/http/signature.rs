/*
[INPUT]:  Credentials and canonical query strings
[OUTPUT]: Authorization header (Bearer JWT with nonce and query_hash)
[POS]:    HTTP layer - request signing for authenticated endpoints
[UPDATE]: When changing signing algorithm, claim set or header format
*/

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use sha2::{Digest, Sha512};
use uuid::Uuid;

use crate::auth::{Credentials, JwtEncoder, SignedPayload};
use crate::http::Result;
use crate::types::Query;

/// Signs requests for authenticated (Exchange API) endpoints
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    encoder: JwtEncoder,
}

impl RequestSigner {
    /// Create a signer; blank credentials are a configuration error
    pub fn new(credentials: Credentials) -> Result<Self> {
        credentials.validate()?;
        let encoder = JwtEncoder::new(credentials.secret_key());
        Ok(Self {
            credentials,
            encoder,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fresh 128-bit random nonce
    pub fn nonce(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// SHA-512 hex digest of a canonical query string
    pub fn query_hash(query_string: &str) -> String {
        hex::encode(Sha512::digest(query_string.as_bytes()))
    }

    /// Claims for one request; `query_hash` only when the query string is non-empty
    pub fn payload(&self, query_string: &str) -> SignedPayload {
        let payload = SignedPayload::new(self.credentials.access_key(), self.nonce());
        if query_string.is_empty() {
            payload
        } else {
            payload.with_query_hash(Self::query_hash(query_string))
        }
    }

    /// Signed JWT for an already canonicalized query string
    pub fn sign_query_string(&self, query_string: &str) -> Result<String> {
        self.encoder.encode(&self.payload(query_string))
    }

    /// `Bearer <token>` for an already canonicalized query string
    pub fn authorization_for(&self, query_string: &str) -> Result<HeaderValue> {
        let token = self.sign_query_string(query_string)?;
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Authorization header for a request carrying `query`
    pub fn auth_header(&self, query: &Query) -> Result<(HeaderName, HeaderValue)> {
        let value = self.authorization_for(&query.to_query_string())?;
        Ok((AUTHORIZATION, value))
    }

    /// Verify a token produced by this signer and return its claims
    pub fn verify(&self, token: &str) -> Result<SignedPayload> {
        self.encoder.decode(token)
    }
}
