//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "quickscan.toml")]
    pub output: String,

    /// Include comments explaining every setting
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

        println!("📝 Initializing QuickScan configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set dashboard.base_url (or export QUICKSCAN_API_BASE_URL)");
                println!("  2. For production, set encryption.algorithm = \"aes-256-gcm\"");
                println!("     and provide QUICKSCAN_DEVICE_KEY in the environment or a .env file");
                println!("  3. Validate configuration: quickscan validate-config");
                println!("  4. Check the dashboard: quickscan check");
                println!();
                Ok(exit_code::OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(exit_code::FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# QuickScan Configuration File

environment = "development"

[application]
log_level = "info"

[dashboard]
base_url = "http://localhost:3000/api"
timeout_seconds = 10

[queue]
storage_path = "./data"
max_retries = 3
drain_order = "newest_first"
drain_interval_seconds = 60

[session]
grace_period_ms = 3000

[encryption]
algorithm = "simulation-base64"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# QuickScan Configuration File
#
# Values of the form ${VAR_NAME} are replaced from the environment (and a
# .env file, if present). QUICKSCAN_* variables override individual settings,
# e.g. QUICKSCAN_API_BASE_URL overrides dashboard.base_url.

# Runtime environment: development | staging | production
# Production requires https and aes-256-gcm payload encryption.
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Dashboard
# ============================================================================
[dashboard]
# Base URL of the dashboard API
base_url = "http://localhost:3000/api"

# Paths appended to base_url
transmit_path = "/quickscan/transmit"
health_path = "/health"

# Request timeouts in seconds
timeout_seconds = 10
health_timeout_seconds = 5

# Header values sent with every transmission
protocol_version = "1.0"
client_type = "nurse-assistant"

# Application version reported in request metadata
app_version = "1.0.0"

# TLS certificate verification (cannot be disabled in production)
tls_verify = true

# ============================================================================
# Offline Queue
# ============================================================================
[queue]
# Directory holding the queue document and the device identifier
storage_path = "./data"

# Failed drain attempts after which a queued record is dropped (1-10)
max_retries = 3

# Drain order: newest_first | oldest_first
drain_order = "newest_first"

# Seconds between drains for `quickscan drain --watch`
drain_interval_seconds = 60

# ============================================================================
# Live Session
# ============================================================================
[session]
# Milliseconds between confirmed delivery and disposal of the session
grace_period_ms = 3000

# ============================================================================
# Payload Encryption
# ============================================================================
[encryption]
# simulation-base64 | aes-256-gcm
# simulation-base64 only encodes the record and is rejected in production.
algorithm = "simulation-base64"

# Key material for aes-256-gcm (use an environment variable)
# key = "${QUICKSCAN_DEVICE_KEY}"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON log files in addition to console output
local_enabled = false

# Log directory
local_path = "./logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "quickscan.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "quickscan.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_are_valid() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_config(&content).unwrap();
            assert!(config.validate().is_ok());
            assert_eq!(config.queue.max_retries, 3);
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("quickscan.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), exit_code::CONFIG);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().await.unwrap(), exit_code::OK);
        assert!(fs::read_to_string(&output).unwrap().contains("[dashboard]"));
    }
}
