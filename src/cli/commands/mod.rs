//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod check;
pub mod drain;
pub mod init;
pub mod status;
pub mod submit;
pub mod validate;

use crate::config::{load_config_or_default, QuickScanConfig};
use crate::core::transmission::TransmissionCoordinator;

/// Load configuration for a runtime command, printing the failure
///
/// A missing file falls back to defaults plus environment overrides.
pub(crate) fn load_runtime_config(config_path: &str) -> Option<QuickScanConfig> {
    match load_config_or_default(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            println!("❌ Failed to load configuration");
            println!("   Error: {e}");
            None
        }
    }
}

/// Build the coordinator, printing the failure
pub(crate) async fn build_coordinator(config: &QuickScanConfig) -> Option<TransmissionCoordinator> {
    match TransmissionCoordinator::from_config(config).await {
        Ok(coordinator) => Some(coordinator),
        Err(e) => {
            println!("❌ Failed to initialize transmission");
            println!("   Error: {e}");
            None
        }
    }
}
