// CPQ Bridge - ConnectWise CPQ Operation Adapter
// Copyright (c) 2025 CPQ Bridge Contributors
// Licensed under the MIT License

//! # CPQ Bridge
//!
//! Typed operations over the ConnectWise CPQ (Sell) REST API: quotes, quote
//! items, customers, tabs, terms, recurring revenue, tax codes, templates and
//! users.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`adapters`] - CPQ API integration (transport, executor, pagination,
//!   condition compiler, patch builder, operation catalog, client)
//! - [`domain`] - Error types, result alias and identifiers
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cpq_bridge::adapters::cpq::{CpqClient, Operation};
//! use cpq_bridge::config::load_config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cpq-bridge.toml")?;
//!     let client = CpqClient::new(&config.cpq)?;
//!
//!     let operation: Operation = serde_json::from_value(serde_json::json!({
//!         "resource": "quoteItems",
//!         "operation": "getAll",
//!         "conditionsUi": [
//!             { "field": "quantity", "operator": ">", "valueType": "integer", "value": "5" }
//!         ],
//!         "limit": 100
//!     }))?;
//!
//!     let items = client.invoke(&operation).await?;
//!     println!("Fetched {} quote items", items.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Conditions
//!
//! Structured filter rows compile to the API's textual grammar:
//!
//! ```rust
//! use cpq_bridge::adapters::cpq::conditions::{compile, ConditionRow, Logic, ValueType};
//!
//! let rows = vec![
//!     ConditionRow::new("a", "=", ValueType::Integer, "1"),
//!     ConditionRow::new("b", "=", ValueType::Integer, "2"),
//! ];
//! assert_eq!(compile(None, &rows, Logic::Or).as_deref(), Some("a = 1 OR b = 2"));
//! ```
//!
//! ## Error Handling
//!
//! All library functions return [`domain::Result`], whose error type
//! [`domain::CpqError`] separates configuration, API, validation and I/O
//! failures. API failures carry the method, URL, status, response body and
//! number of attempts.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
