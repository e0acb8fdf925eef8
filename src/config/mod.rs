//! Configuration management for QuickScan.
//!
//! TOML-based configuration with `${VAR_NAME}` substitution, `QUICKSCAN_*`
//! environment overrides, defaults for every setting and validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quickscan::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quickscan.toml")?;
//! println!("Dashboard: {}", config.dashboard.transmit_url());
//! println!("Max retries: {}", config.queue.max_retries);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DashboardConfig`] - Dashboard endpoint, headers and timeouts
//! - [`QueueConfig`] - Offline queue location, retry limit and drain order
//! - [`SessionConfig`] - Grace period before a transmitted session is disposed
//! - [`EncryptionConfig`] - Payload encryption scheme and key
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [dashboard]
//! base_url = "https://dashboard.example.com/api"
//!
//! [queue]
//! storage_path = "/var/lib/quickscan"
//! max_retries = 3
//!
//! [encryption]
//! algorithm = "aes-256-gcm"
//! key = "${QUICKSCAN_DEVICE_KEY}"
//! ```
//!
//! `QUICKSCAN_API_BASE_URL` overrides `dashboard.base_url` regardless of the file.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, BASE_URL_ENV};
pub use schema::{
    ApplicationConfig, DashboardConfig, DrainOrder, EncryptionAlgorithm, EncryptionConfig,
    Environment, LoggingConfig, QueueConfig, QuickScanConfig, SessionConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
