//! External system integrations for the CPQ bridge.
//!
//! - [`cpq`] - ConnectWise CPQ (Sell) REST API
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. The network sits behind the
//! [`cpq::Transport`] trait, so retry, pagination and dispatch logic run
//! unchanged against scripted responses.
//!
//! ```rust,no_run
//! use cpq_bridge::adapters::cpq::CpqClient;
//! use cpq_bridge::config::{secret_string, CpqConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CpqConfig {
//!     access_key: "mycompany".to_string(),
//!     public_key: "public".to_string(),
//!     private_key: secret_string("private".to_string()),
//!     ..CpqConfig::default()
//! };
//!
//! let client = CpqClient::new(&config)?;
//! client.health_check().await?;
//! # Ok(())
//! # }
//! ```

pub mod cpq;
