//! Run command implementation
//!
//! Executes a request document (one operation object or an array of them)
//! and writes each resulting record to stdout as a JSON line
//! `{"item": <index>, "json": <record>}`. Progress and errors go to stderr.

use crate::adapters::cpq::{BatchOptions, BatchRecord, CpqClient, Operation};
use crate::cli::{exit_code_for, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::load_config;
use crate::domain::{CpqError, Result};
use crate::log_error_with_context;
use clap::Args;
use serde_json::Value;
use std::io::{Read, Write};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Request document as inline JSON
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    pub request: Option<String>,

    /// Read the request document from a file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Emit an {"error": ...} record for failed invocations instead of aborting
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Number of invocations to run concurrently
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Pretty-print records instead of one JSON object per line
    #[arg(long)]
    pub pretty: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration file: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let entries = match self.read_document().and_then(|text| parse_request_document(&text)) {
            Ok(entries) => entries,
            Err(e) => {
                log_error_with_context!(&e, "Failed to read request document");
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        tracing::info!(
            invocations = entries.len(),
            invalid = entries.iter().filter(|e| e.is_err()).count(),
            concurrency = self.concurrency,
            continue_on_fail = self.continue_on_fail,
            "Running CPQ operations"
        );

        let client = match CpqClient::new(&config.cpq) {
            Ok(client) => client,
            Err(e) => {
                eprintln!("❌ Failed to create CPQ client: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let options = BatchOptions {
            continue_on_fail: self.continue_on_fail,
            concurrency: usize::from(self.concurrency),
        };

        match client.run_entries(entries, &options).await {
            Ok(records) => {
                self.write_records(&records)?;
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                log_error_with_context!(&e, "CPQ operation failed");
                eprintln!("❌ {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn read_document(&self) -> Result<String> {
        match (&self.request, self.file.as_deref()) {
            (Some(inline), _) => Ok(inline.clone()),
            (None, Some("-")) => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                CpqError::Io(format!("Failed to read request file {path}: {e}"))
            }),
            (None, None) => Err(CpqError::Validation(
                "Provide a request with --request or --file".to_string(),
            )),
        }
    }

    fn write_records(&self, records: &[BatchRecord]) -> anyhow::Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        for record in records {
            let line = if self.pretty {
                serde_json::to_string_pretty(record)?
            } else {
                serde_json::to_string(record)?
            };
            writeln!(out, "{line}")?;
        }

        out.flush()?;
        Ok(())
    }
}

/// Parse a request document into operations
///
/// Accepts a single operation object or an array of them. Each entry is
/// parsed on its own so that one bad entry fails only its own invocation.
///
/// # Errors
///
/// Returns `CpqError::Validation` when the document itself is not JSON.
/// Entries that are not a known operation come back as per-entry
/// validation errors naming their index.
pub fn parse_request_document(text: &str) -> Result<Vec<Result<Operation>>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| CpqError::Validation(format!("Request document is not valid JSON: {e}")))?;

    let entries = match document {
        Value::Array(entries) => entries,
        single => vec![single],
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|e| {
                CpqError::Validation(format!("Invalid operation at index {index}: {e}"))
            })
        })
        .collect())
}
