//! Drain command implementation
//!
//! Re-sends queued records once, or periodically with `--watch` until a
//! shutdown signal arrives.

use super::{build_coordinator, load_runtime_config};
use crate::cli::exit_code;
use crate::core::queue::DrainReport;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the drain command
#[derive(Args, Debug)]
pub struct DrainArgs {
    /// Keep draining periodically until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between drains in watch mode (defaults to queue.drain_interval_seconds)
    #[arg(long)]
    pub interval: Option<u64>,
}

impl DrainArgs {
    /// Execute the drain command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let Some(config) = load_runtime_config(config_path) else {
            return Ok(exit_code::CONFIG);
        };
        let Some(coordinator) = build_coordinator(&config).await else {
            return Ok(exit_code::FATAL);
        };

        if self.watch {
            let interval = self.interval.unwrap_or(config.queue.drain_interval_seconds).max(1);
            tracing::info!(interval_secs = interval, "Starting periodic queue drain");
            println!("🔁 Draining offline queue every {interval}s (Ctrl+C to stop)");

            let handle = Arc::new(coordinator)
                .spawn_periodic_drain(Duration::from_secs(interval), shutdown_signal);
            handle.await?;

            println!("⏹️  Periodic drain stopped");
            return Ok(exit_code::OK);
        }

        println!("🔁 Draining offline queue");
        println!();

        let report = coordinator.drain_queue().await;
        print_report(&report);
        Ok(exit_code_for(&report))
    }
}

fn print_report(report: &DrainReport) {
    println!("  Transmitted: {}", report.transmitted);
    println!("  Retried:     {}", report.retried);
    println!("  Dropped:     {}", report.dropped.len());
    for label in &report.dropped {
        println!("    ❌ {label} (retry limit reached, record lost)");
    }
    println!("  Remaining:   {}", report.remaining);
    if !report.persisted {
        println!("  ❗ Queue could not be written to disk");
    }
    println!();
}

fn exit_code_for(report: &DrainReport) -> i32 {
    if report.remaining == 0 && report.dropped.is_empty() && report.persisted {
        exit_code::OK
    } else {
        exit_code::QUEUED
    }
}
