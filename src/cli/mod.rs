//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the CPQ bridge using clap.

pub mod commands;

use crate::domain::CpqError;
use clap::{Parser, Subcommand};

/// Exit code: success
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code: configuration could not be loaded or is invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code: the CPQ API rejected a call or could not be reached
pub const EXIT_API_ERROR: i32 = 3;
/// Exit code: caller input was invalid
pub const EXIT_VALIDATION_ERROR: i32 = 4;
/// Exit code: anything else
pub const EXIT_FATAL: i32 = 5;

/// Map a library error to the process exit code
pub fn exit_code_for(error: &CpqError) -> i32 {
    match error {
        CpqError::Configuration(_) => EXIT_CONFIG_ERROR,
        CpqError::Api(_) => EXIT_API_ERROR,
        CpqError::Validation(_) | CpqError::Serialization(_) => EXIT_VALIDATION_ERROR,
        CpqError::Io(_) | CpqError::Other(_) => EXIT_FATAL,
    }
}

/// CPQ Bridge - ConnectWise CPQ operations from the command line
#[derive(Parser, Debug)]
#[command(name = "cpq-bridge")]
#[command(version, about, long_about = None)]
#[command(author = "CPQ Bridge Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cpq-bridge.toml", env = "CPQ_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CPQ_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one or more operations and print the resulting records as JSON lines
    Run(commands::run::RunArgs),

    /// Verify credentials and connectivity against the CPQ API
    Check(commands::check::CheckArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// List supported resource/operation pairs
    Operations(commands::operations::OperationsArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApiError;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from([
            "cpq-bridge",
            "run",
            "--request",
            r#"{"resource":"templates","operation":"getAll"}"#,
        ]);
        assert_eq!(cli.config, "cpq-bridge.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cpq-bridge", "--config", "custom.toml", "check"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cpq-bridge", "--log-level", "debug", "operations"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["cpq-bridge", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cpq-bridge", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&CpqError::Configuration("x".into())), 2);
        assert_eq!(
            exit_code_for(&CpqError::Api(ApiError::Timeout("slow".into()))),
            3
        );
        assert_eq!(exit_code_for(&CpqError::Validation("x".into())), 4);
        assert_eq!(exit_code_for(&CpqError::Other("x".into())), 5);
    }
}
