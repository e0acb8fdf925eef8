//! Status command implementation
//!
//! Lists records waiting in the offline queue.

use super::{build_coordinator, load_runtime_config};
use crate::cli::exit_code;
use crate::core::transmission::QueueStatus;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also check the dashboard health endpoint
    #[arg(long)]
    pub check: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking offline queue status");

        println!("📊 Offline Queue Status");
        println!();

        let Some(config) = load_runtime_config(config_path) else {
            return Ok(exit_code::CONFIG);
        };
        let Some(coordinator) = build_coordinator(&config).await else {
            return Ok(exit_code::FATAL);
        };

        println!("  Dashboard: {}", config.dashboard.transmit_url());
        println!("  Storage:   {}", config.queue.storage_path);
        if self.check {
            let online = coordinator.check_connection().await;
            println!(
                "  Health:    {}",
                if online { "✅ reachable" } else { "❌ unreachable" }
            );
        }
        println!();

        let status = coordinator.queue_status().await;
        print_status(&status);
        Ok(exit_code::OK)
    }
}

fn print_status(status: &QueueStatus) {
    if status.pending() == 0 {
        println!("No records waiting for transmission.");
        println!();
        return;
    }

    println!("{} record(s) pending:", status.pending());
    println!();
    println!(
        "{:<38} {:<32} {:<22} {:<8}",
        "Entry ID", "Patient", "Queued At", "Retries"
    );
    println!("{}", "-".repeat(102));

    for item in &status.items {
        println!(
            "{:<38} {:<32} {:<22} {}/{}",
            item.entry_id,
            item.patient_id,
            item.enqueued_at.format("%Y-%m-%d %H:%M:%S"),
            item.retry_count,
            status.max_retries
        );
    }

    if !status.persisted {
        println!();
        println!("❗ The latest queue changes are not yet on disk");
    }
    println!();
}
