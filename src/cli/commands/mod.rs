//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod check;
pub mod init;
pub mod operations;
pub mod run;
pub mod validate;
