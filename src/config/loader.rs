//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BridgeConfig;
use super::secret_string;
use crate::domain::errors::CpqError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BridgeConfig
/// 4. Applies environment variable overrides (CPQ_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `CpqError::Configuration` if the file is missing or unreadable,
/// if a referenced environment variable is unset, if the TOML is malformed,
/// or if validation fails.
///
/// # Examples
///
/// ```no_run
/// use cpq_bridge::config::load_config;
///
/// let config = load_config("cpq-bridge.toml").expect("Failed to load config");
/// println!("{}", config.cpq.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CpqError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CpqError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Parses, overrides and validates configuration held in memory
pub fn load_config_from_str(contents: &str) -> Result<BridgeConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: BridgeConfig = toml::from_str(&contents)
        .map_err(|e| CpqError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| CpqError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied verbatim so documented placeholders don't have
/// to be set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CpqError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CpqError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the CPQ_* prefix
fn apply_env_overrides(config: &mut BridgeConfig) -> Result<()> {
    if let Ok(val) = std::env::var("CPQ_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("CPQ_BASE_URL") {
        config.cpq.base_url = val;
    }
    if let Ok(val) = std::env::var("CPQ_ACCESS_KEY") {
        config.cpq.access_key = val;
    }
    if let Ok(val) = std::env::var("CPQ_PUBLIC_KEY") {
        config.cpq.public_key = val;
    }
    if let Ok(val) = std::env::var("CPQ_PRIVATE_KEY") {
        config.cpq.private_key = secret_string(val);
    }

    if let Ok(val) = std::env::var("CPQ_DEBUG") {
        config.cpq.debug.enabled = parse_bool("CPQ_DEBUG", &val)?;
    }
    if let Ok(val) = std::env::var("CPQ_DEBUG_SHOW_AUTH_TOKEN") {
        config.cpq.debug.show_auth_token = parse_bool("CPQ_DEBUG_SHOW_AUTH_TOKEN", &val)?;
    }

    if let Ok(val) = std::env::var("CPQ_PAGINATION_MAX_PAGES") {
        let pages = val.parse().map_err(|_| {
            CpqError::Configuration(format!(
                "CPQ_PAGINATION_MAX_PAGES must be a positive integer, got '{val}'"
            ))
        })?;
        config.cpq.pagination.max_pages = Some(pages);
    }

    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CpqError::Configuration(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars_replaces_known_variable() {
        std::env::set_var("CPQ_LOADER_TEST_KEY", "secret-value");
        let out = substitute_env_vars("private_key = \"${CPQ_LOADER_TEST_KEY}\"").unwrap();
        assert_eq!(out.trim(), "private_key = \"secret-value\"");
        std::env::remove_var("CPQ_LOADER_TEST_KEY");
    }

    #[test]
    fn test_substitute_env_vars_reports_missing() {
        let err = substitute_env_vars("key = \"${CPQ_LOADER_DEFINITELY_UNSET}\"").unwrap_err();
        assert!(err
            .to_string()
            .contains("CPQ_LOADER_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let out = substitute_env_vars("# private_key = \"${CPQ_LOADER_COMMENTED_OUT}\"").unwrap();
        assert!(out.contains("${CPQ_LOADER_COMMENTED_OUT}"));
    }

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
