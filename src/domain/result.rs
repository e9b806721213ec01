//! Result type alias for the CPQ bridge

use super::errors::CpqError;

/// Result type alias for CPQ bridge operations
///
/// # Examples
///
/// ```
/// use cpq_bridge::domain::result::Result;
/// use cpq_bridge::domain::errors::CpqError;
///
/// fn failing_function() -> Result<()> {
///     Err(CpqError::Validation("Quote ID cannot be empty".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, CpqError>;
