//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cpq-bridge.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing CPQ bridge configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set access_key in {}", self.output);
                println!("  2. Create a .env file with your API keys:");
                println!("     - CPQ_PUBLIC_KEY=...");
                println!("     - CPQ_PRIVATE_KEY=...");
                println!("  3. Validate configuration: cpq-bridge validate-config");
                println!("  4. Check credentials: cpq-bridge check");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

fn generate_minimal_config() -> String {
    r#"# CPQ Bridge Configuration File

[application]
log_level = "info"

[cpq]
base_url = "https://sellapi.quosalsell.com"
access_key = "yourcompany"
public_key = "${CPQ_PUBLIC_KEY}"
private_key = "${CPQ_PRIVATE_KEY}"
timeout_seconds = 60
"#
    .to_string()
}

fn generate_config_with_examples() -> String {
    r#"# CPQ Bridge Configuration File
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any CPQ_* environment variable listed below overrides the file.

[application]
# trace | debug | info | warn | error   (override: CPQ_LOG_LEVEL)
log_level = "info"

[cpq]
# Sell API host (override: CPQ_BASE_URL)
base_url = "https://sellapi.quosalsell.com"

# API keys from Settings > API Keys (overrides: CPQ_ACCESS_KEY,
# CPQ_PUBLIC_KEY, CPQ_PRIVATE_KEY)
access_key = "yourcompany"
public_key = "${CPQ_PUBLIC_KEY}"
private_key = "${CPQ_PRIVATE_KEY}"

# Per-request timeout
timeout_seconds = 60

[cpq.debug]
# Log a summary of every request and response (override: CPQ_DEBUG)
enabled = false
# WARNING: writes the full Authorization header to the logs
# (override: CPQ_DEBUG_SHOW_AUTH_TOKEN)
show_auth_token = false

[cpq.retry]
max_attempts = 3
initial_delay_ms = 500
backoff_multiplier = 2.0
max_delay_ms = 30000
retryable_statuses = [429, 500, 502, 503, 504]

[cpq.pagination]
# Page size for list calls without pageSize (1-1000)
default_page_size = 50
# Stop paging after this many pages (override: CPQ_PAGINATION_MAX_PAGES)
# max_pages = 500
# Stop paging after this many seconds
# max_duration_seconds = 300

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
    .to_string()
}
