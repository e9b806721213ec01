//! Domain error types
//!
//! This module defines the error hierarchy for the CPQ bridge.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main CPQ bridge error type
///
/// This is the primary error type used throughout the crate. Every failure
/// bubbles up to the invocation boundary as one of these variants.
#[derive(Debug, Error)]
pub enum CpqError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors returned by (or while talking to) the CPQ API
    #[error("CPQ API error: {0}")]
    Api(#[from] ApiError),

    /// Caller input errors (invalid JSON, empty identifiers, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CpqError {
    /// Returns the HTTP status code when the error came from an API response
    pub fn status(&self) -> Option<u16> {
        match self {
            CpqError::Api(api) => api.status(),
            _ => None,
        }
    }
}

/// CPQ API errors
///
/// Structured failure wrapping the original error context of a request.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status code
    #[error("{method} {url} failed with status {status} after {attempts} attempt(s): {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
        body: Option<String>,
        attempts: u32,
    },

    /// Failed to reach the server
    #[error("Failed to connect to CPQ API: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status code, if the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, if one was captured
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Whether the failure is transient for the given set of retryable statuses
    ///
    /// Only status-bearing failures are retried; connection failures and
    /// timeouts surface immediately.
    pub fn is_retryable(&self, retryable_statuses: &[u16]) -> bool {
        self.status()
            .map(|status| retryable_statuses.contains(&status))
            .unwrap_or(false)
    }
}

impl From<std::io::Error> for CpqError {
    fn from(err: std::io::Error) -> Self {
        CpqError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CpqError {
    fn from(err: serde_json::Error) -> Self {
        CpqError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for CpqError {
    fn from(err: toml::de::Error) -> Self {
        CpqError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<url::ParseError> for CpqError {
    fn from(err: url::ParseError) -> Self {
        CpqError::Configuration(format!("Invalid URL: {err}"))
    }
}
