/*
[INPUT]:  Access key and secret key issued by Upbit
[OUTPUT]: Immutable credential pair for request signing
[POS]:    Auth layer - credential ownership
[UPDATE]: When credential sources change
*/

use crate::http::{Result, UpbitError};

const ACCESS_KEY_ENV: &str = "UPBIT_OPEN_API_ACCESS_KEY";
const SECRET_KEY_ENV: &str = "UPBIT_OPEN_API_SECRET_KEY";

/// Credentials for authenticated requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Load credentials from `UPBIT_OPEN_API_ACCESS_KEY` / `UPBIT_OPEN_API_SECRET_KEY`
    pub fn from_env() -> Result<Self> {
        let access_key = std::env::var(ACCESS_KEY_ENV)
            .map_err(|_| UpbitError::Configuration(format!("{ACCESS_KEY_ENV} not set")))?;
        let secret_key = std::env::var(SECRET_KEY_ENV)
            .map_err(|_| UpbitError::Configuration(format!("{SECRET_KEY_ENV} not set")))?;

        let credentials = Self::new(access_key, secret_key);
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Reject blank keys; a wrong but non-empty secret only shows up as a 401
    pub fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() {
            return Err(UpbitError::Configuration(
                "access key must not be empty".to_string(),
            ));
        }
        if self.secret_key.is_empty() {
            return Err(UpbitError::Configuration(
                "secret key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
