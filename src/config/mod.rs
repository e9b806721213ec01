//! Configuration management for the CPQ bridge.
//!
//! Configuration lives in a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CPQ_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [cpq]
//! base_url = "https://sellapi.quosalsell.com"
//! access_key = "mycompany"
//! public_key = "${CPQ_PUBLIC_KEY}"
//! private_key = "${CPQ_PRIVATE_KEY}"
//!
//! [cpq.debug]
//! enabled = false
//!
//! [cpq.pagination]
//! default_page_size = 200
//! max_pages = 500
//! ```
//!
//! ```rust,no_run
//! use cpq_bridge::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cpq-bridge.toml")?;
//! println!("CPQ API: {}", config.cpq.base_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, BridgeConfig, CpqConfig, DebugConfig, LoggingConfig, PaginationConfig,
    RetryConfig, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use secret::{secret_string, SecretString, SecretValue};
