//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for QuickScan using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Process exit codes shared by all commands
pub mod exit_code {
    /// Success
    pub const OK: i32 = 0;
    /// Record queued for retry, or a drain left records behind
    pub const QUEUED: i32 = 1;
    /// Configuration could not be loaded or is invalid
    pub const CONFIG: i32 = 2;
    /// Session record failed validation
    pub const VALIDATION: i32 = 3;
    /// Dashboard not reachable
    pub const CONNECTION: i32 = 4;
    /// Any other failure
    pub const FATAL: i32 = 5;
}

/// QuickScan - offline-first relay for de-identified scan sessions
#[derive(Parser, Debug)]
#[command(name = "quickscan")]
#[command(version, about, long_about = None)]
#[command(author = "QuickScan Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "quickscan.toml", env = "QUICKSCAN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "QUICKSCAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate and transmit a session record, queueing it if the dashboard is unreachable
    Submit(commands::submit::SubmitArgs),

    /// Re-send queued records
    Drain(commands::drain::DrainArgs),

    /// Show the offline queue
    Status(commands::status::StatusArgs),

    /// Check the dashboard health endpoint
    Check(commands::check::CheckArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
