//! Logging and observability
//!
//! Structured logging with:
//! - Human-readable console output on stderr
//! - Configurable log levels, overridable with `RUST_LOG`
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use cpq_bridge::logging::init_logging;
//! use cpq_bridge::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cpq_bridge::log_error_with_context;
/// use cpq_bridge::domain::CpqError;
///
/// let error = CpqError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use cpq_bridge::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "GET /api/quotes failed with status 503");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying CPQ request"
        );
    };
}
