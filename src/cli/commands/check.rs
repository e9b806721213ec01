//! Check command implementation
//!
//! Issues the credential test request (`GET /api/quotes?page=1&pageSize=1`)
//! and reports the outcome.

use crate::adapters::cpq::CpqClient;
use crate::cli::{exit_code_for, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::load_config;
use crate::domain::CpqError;
use clap::Args;
use serde_json::{json, Value};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) if self.json => {
                println!("{}", serde_json::to_string_pretty(&failure_report("config", &e))?);
                return Ok(EXIT_CONFIG_ERROR);
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if !self.json {
            println!("🔌 Checking CPQ credentials against {}", config.cpq.base_url);
        }

        let client = match CpqClient::new(&config.cpq) {
            Ok(client) => client,
            Err(e) if self.json => {
                println!("{}", serde_json::to_string_pretty(&failure_report("client", &e))?);
                return Ok(exit_code_for(&e));
            }
            Err(e) => {
                println!("❌ Failed to create CPQ client: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match client.health_check().await {
            Ok(report) if self.json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(EXIT_SUCCESS)
            }
            Ok(report) => {
                println!("✅ Credentials accepted ({} ms)", report.latency_ms);
                println!("   Checked at: {}", report.checked_at.to_rfc3339());
                Ok(EXIT_SUCCESS)
            }
            Err(e) if self.json => {
                println!("{}", serde_json::to_string_pretty(&failure_report("request", &e))?);
                Ok(exit_code_for(&e))
            }
            Err(e) => {
                println!("❌ Credential check failed");
                println!("   Error: {e}");
                if e.status() == Some(401) || e.status() == Some(403) {
                    println!("   Verify access_key, public_key and private_key");
                }
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// JSON body printed in place of the report when `--json` is set and the check fails
fn failure_report(stage: &str, error: &CpqError) -> Value {
    json!({
        "ok": false,
        "stage": stage,
        "status": error.status(),
        "error": error.to_string(),
    })
}
