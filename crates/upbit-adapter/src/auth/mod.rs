/*
[INPUT]:  API credentials and signed payload claims
[OUTPUT]: Credential values and JWT tokens
[POS]:    Auth layer - handles Upbit API authentication primitives
[UPDATE]: When auth flow or token format changes
*/

pub mod credentials;
pub mod jwt;

pub use credentials::Credentials;
pub use jwt::{JwtEncoder, QUERY_HASH_ALG, SignedPayload};
