//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the QuickScan configuration file.

use crate::cli::exit_code;
use crate::config::{load_config, Environment};
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

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(exit_code::CONFIG);
            }
        };

        let environment = match config.environment {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {environment}");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dashboard: {}", config.dashboard.transmit_url());
        println!("  Health Endpoint: {}", config.dashboard.health_url());
        println!("  Request Timeout: {}s", config.dashboard.timeout_seconds);
        println!("  Queue Storage: {}", config.queue.storage_path);
        println!("  Max Retries: {}", config.queue.max_retries);
        println!("  Drain Order: {}", config.queue.drain_order);
        println!("  Disposal Grace Period: {}ms", config.session.grace_period_ms);
        println!("  Payload Encryption: {}", config.encryption.algorithm.as_str());
        println!();
        Ok(exit_code::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let args = ValidateArgs {};
        let code = args.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, exit_code::CONFIG);
    }

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[queue]\nmax_retries = 3\n").unwrap();
        file.flush().unwrap();

        let args = ValidateArgs {};
        let code = args
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::OK);
    }
}
