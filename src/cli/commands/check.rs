//! Check command implementation

use super::load_runtime_config;
use crate::adapters::dashboard::{HttpTransport, Transport};
use crate::cli::exit_code;
use clap::Args;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_runtime_config(config_path) else {
            return Ok(exit_code::CONFIG);
        };

        let transport = match HttpTransport::new(&config.dashboard) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ Failed to create dashboard client");
                println!("   Error: {e}");
                return Ok(exit_code::FATAL);
            }
        };

        let health_url = config.dashboard.health_url();
        println!("🔌 Checking dashboard: {health_url}");

        if transport.check_connection().await {
            tracing::info!(url = %health_url, "Dashboard reachable");
            println!("✅ Dashboard is reachable");
            Ok(exit_code::OK)
        } else {
            tracing::warn!(url = %health_url, "Dashboard unreachable");
            println!("❌ Dashboard is not reachable");
            println!("   Records submitted now will be queued for retry.");
            Ok(exit_code::CONNECTION)
        }
    }
}
