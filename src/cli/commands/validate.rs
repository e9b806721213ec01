//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the CPQ bridge configuration file.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::{load_config, BridgeConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                for line in summary_lines(&config) {
                    println!("  {line}");
                }
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_CONFIG_ERROR)
            }
        }
    }
}

/// Human-readable summary with credentials masked
fn summary_lines(config: &BridgeConfig) -> Vec<String> {
    let cpq = &config.cpq;
    let pagination = &cpq.pagination;

    let mut lines = vec![
        format!("Log Level: {}", config.application.log_level),
        format!("CPQ API: {}", cpq.base_url),
        format!("Access Key: {}", cpq.access_key),
        format!("Public Key: {}", mask(&cpq.public_key)),
        "Private Key: ********".to_string(),
        format!("Timeout: {}s", cpq.timeout_seconds),
        format!(
            "Retry: {} attempts, {}ms initial delay, x{} backoff, statuses {:?}",
            cpq.retry.max_attempts,
            cpq.retry.initial_delay_ms,
            cpq.retry.backoff_multiplier,
            cpq.retry.retryable_statuses
        ),
        format!("Default Page Size: {}", pagination.default_page_size),
        format!(
            "Max Pages: {}",
            pagination
                .max_pages
                .map_or_else(|| "unbounded".to_string(), |p| p.to_string())
        ),
        format!(
            "Max Duration: {}",
            pagination
                .max_duration_seconds
                .map_or_else(|| "unbounded".to_string(), |s| format!("{s}s"))
        ),
        format!("Debug Logging: {}", cpq.debug.enabled),
    ];

    if cpq.debug.show_auth_token {
        lines.push("⚠️  show_auth_token is on: Authorization headers will be logged".to_string());
    }

    if config.logging.local_enabled {
        lines.push(format!(
            "File Logging: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        ));
    }

    lines
}

/// Keep the first four characters of a key
fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{visible}****")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_mask_keeps_prefix() {
        assert_eq!(mask("abcdefgh"), "abcd****");
        assert_eq!(mask("ab"), "ab****");
    }

    #[test]
    fn test_summary_never_prints_private_key() {
        let config = load_config_from_str(
            r#"
[cpq]
access_key = "acme"
public_key = "public-key-value"
private_key = "super-secret-private"
"#,
        )
        .unwrap();

        let summary = summary_lines(&config).join("\n");
        assert!(!summary.contains("super-secret-private"));
        assert!(!summary.contains("public-key-value"));
        assert!(summary.contains("Max Pages: unbounded"));
    }
}
