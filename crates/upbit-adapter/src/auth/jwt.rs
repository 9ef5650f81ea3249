/*
[INPUT]:  Signed payload claims and the API secret key
[OUTPUT]: HS256 JWT strings (and decoded claims for verification)
[POS]:    Auth layer - token encoding for the Authorization header
[UPDATE]: When the claim set or signing algorithm changes
*/

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::http::Result;

/// Hash algorithm name advertised in `query_hash_alg`
pub const QUERY_HASH_ALG: &str = "SHA512";

/// Claims carried by every request token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub access_key: String,
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_hash_alg: Option<String>,
}

impl SignedPayload {
    pub fn new(access_key: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            nonce: nonce.into(),
            query_hash: None,
            query_hash_alg: None,
        }
    }

    /// Attach a SHA-512 query hash
    pub fn with_query_hash(mut self, query_hash: impl Into<String>) -> Self {
        self.query_hash = Some(query_hash.into());
        self.query_hash_alg = Some(QUERY_HASH_ALG.to_string());
        self
    }
}

/// HS256 token encoder bound to one secret key
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    pub fn new(secret_key: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
        }
    }

    /// Encode claims into a compact JWT
    pub fn encode(&self, payload: &SignedPayload) -> Result<String> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            payload,
            &self.encoding_key,
        )?)
    }

    /// Verify a token signed with the same secret and return its claims.
    ///
    /// Request tokens carry no `exp`, so no registered claim is required.
    pub fn decode(&self, token: &str) -> Result<SignedPayload> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let data = decode::<SignedPayload>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
