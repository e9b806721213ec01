//! Configuration schema types
//!
//! This module defines the configuration structure for the CPQ bridge.

use crate::config::{secret_string, SecretString};
use serde::{Deserialize, Serialize};

/// Default CPQ API host
pub const DEFAULT_BASE_URL: &str = "https://sellapi.quosalsell.com";

/// Largest page size the CPQ API accepts
pub const MAX_PAGE_SIZE: usize = 1000;

/// Page size used when a list call doesn't name one
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// CPQ API connection and credentials
    pub cpq: CpqConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.cpq.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// CPQ API configuration
///
/// The three keys form the Basic credential
/// `base64(access_key + "+" + public_key + ":" + private_key)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpqConfig {
    /// Base URL of the CPQ API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access key (the tenant prefix of the Basic username)
    pub access_key: String,

    /// Public API key
    pub public_key: String,

    /// Private API key
    /// Stored securely in memory and automatically zeroized on drop
    pub private_key: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Debug request/response logging
    #[serde(default)]
    pub debug: DebugConfig,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pagination configuration
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Default for CpqConfig {
    /// Defaults with blank keys; does not pass validation on its own
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_key: String::new(),
            public_key: String::new(),
            private_key: secret_string(String::new()),
            timeout_seconds: default_timeout_seconds(),
            debug: DebugConfig::default(),
            retry: RetryConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl CpqConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.trim().is_empty() {
            return Err("cpq.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("cpq.base_url must start with http:// or https://".to_string());
        }

        if self.access_key.trim().is_empty() {
            return Err("cpq.access_key cannot be empty".to_string());
        }

        if self.public_key.trim().is_empty() {
            return Err("cpq.public_key cannot be empty".to_string());
        }

        if self.private_key.expose_secret().is_blank() {
            return Err("cpq.private_key cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("cpq.timeout_seconds must be greater than 0".to_string());
        }

        self.retry.validate()?;
        self.pagination.validate()?;
        Ok(())
    }
}

/// Debug logging switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Emit request/response summaries
    #[serde(default)]
    pub enabled: bool,

    /// Print the full Authorization header in debug summaries
    ///
    /// **SECURITY WARNING**: this writes the Basic credential to the logs.
    /// Only enable it while troubleshooting authentication against a test tenant.
    #[serde(default)]
    pub show_auth_token: bool,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Status codes treated as transient
    #[serde(default = "default_retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            retryable_statuses: default_retryable_statuses(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("cpq.retry.max_attempts must be at least 1".to_string());
        }

        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "cpq.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        Ok(())
    }
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size for list calls that don't specify one; limited lists use
    /// `min(limit, default_page_size)`
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Stop after this many pages even if the API keeps returning full pages
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Stop paging once this many seconds have elapsed
    #[serde(default)]
    pub max_duration_seconds: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_pages: None,
            max_duration_seconds: None,
        }
    }
}

impl PaginationConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.default_page_size) {
            return Err(format!(
                "cpq.pagination.default_page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.default_page_size
            ));
        }

        if self.max_pages == Some(0) {
            return Err("cpq.pagination.max_pages must be at least 1 when set".to_string());
        }

        if self.max_duration_seconds == Some(0) {
            return Err(
                "cpq.pagination.max_duration_seconds must be at least 1 when set".to_string(),
            );
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retryable_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
