//! Domain types for the CPQ bridge.
//!
//! The domain layer provides:
//! - **Error types** ([`CpqError`], [`ApiError`])
//! - **Result type alias** ([`Result`])
//! - **Validated identifiers** ([`RecordId`])
//!
//! All fallible operations return [`Result<T, CpqError>`]:
//!
//! ```rust
//! use cpq_bridge::domain::{CpqError, RecordId, Result};
//!
//! fn parse_id(raw: &str) -> Result<RecordId> {
//!     RecordId::new(raw).map_err(CpqError::Validation)
//! }
//!
//! assert!(parse_id("quote-1").is_ok());
//! assert!(parse_id("").is_err());
//! ```

pub mod errors;
pub mod ids;
pub mod result;

pub use errors::{ApiError, CpqError};
pub use ids::RecordId;
pub use result::Result;
