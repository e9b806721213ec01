//! Basic credential construction
//!
//! CPQ 2022.2+ API keys authenticate with HTTP Basic where the username is
//! `accessKey+publicKey` and the password is the private key.

use crate::config::{CpqConfig, SecretString};
use base64::{engine::general_purpose, Engine as _};
use secrecy::ExposeSecret;

/// Masked rendering of the Authorization header used in debug output
pub const MASKED_AUTHORIZATION: &str = "Basic ***";

/// The three API keys of a CPQ tenant
#[derive(Debug, Clone)]
pub struct Credentials {
    access_key: String,
    public_key: String,
    private_key: SecretString,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        public_key: impl Into<String>,
        private_key: SecretString,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            public_key: public_key.into(),
            private_key,
        }
    }

    pub fn from_config(config: &CpqConfig) -> Self {
        Self::new(
            config.access_key.clone(),
            config.public_key.clone(),
            config.private_key.clone(),
        )
    }

    /// Basic username, `accessKey+publicKey` (keys are trimmed)
    pub fn username(&self) -> String {
        format!("{}+{}", self.access_key.trim(), self.public_key.trim())
    }

    /// base64 of `accessKey+publicKey:privateKey`
    ///
    /// Recomputed on every call; nothing is cached.
    pub fn token(&self) -> String {
        let private_key = self.private_key.expose_secret().as_ref().trim();
        let raw = format!("{}:{}", self.username(), private_key);
        general_purpose::STANDARD.encode(raw.as_bytes())
    }

    /// Full `Authorization` header value
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.token())
    }
}
