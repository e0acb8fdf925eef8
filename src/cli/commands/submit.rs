//! Submit command implementation
//!
//! Reads a session record from a JSON file and runs it through the
//! coordinator: validate, encode, send, and queue on transport failure.

use super::{build_coordinator, load_runtime_config};
use crate::cli::exit_code;
use crate::core::session::SessionStore;
use crate::core::transmission::SubmissionOutcome;
use crate::domain::{QuickScanError, SessionRecord};
use clap::Args;
use std::path::Path;
use zeroize::Zeroizing;

/// Arguments for the submit command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Path to the session record JSON file
    #[arg(short, long)]
    pub record: String,

    /// Delete the record file once it is delivered or safely queued
    #[arg(long)]
    pub remove_input: bool,
}

impl SubmitArgs {
    /// Execute the submit command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(record = %self.record, "Submitting session record");

        println!("📤 Submitting session record: {}", self.record);
        println!();

        let Some(config) = load_runtime_config(config_path) else {
            return Ok(exit_code::CONFIG);
        };

        let record = match read_record(Path::new(&self.record)).await {
            Ok(record) => record,
            Err(e) => {
                println!("❌ Failed to read session record");
                println!("   Error: {e}");
                return Ok(exit_code::VALIDATION);
            }
        };

        let Some(coordinator) = build_coordinator(&config).await else {
            return Ok(exit_code::FATAL);
        };

        let session = SessionStore::new();
        session.restore(record);

        let code = match coordinator.submit(&session).await {
            Ok(SubmissionOutcome::Succeeded { patient_id, ack }) => {
                println!("✅ Transmitted {patient_id}");
                if let Some(id) = ack.transmission_id {
                    println!("   Transmission ID: {id}");
                }
                exit_code::OK
            }
            Ok(SubmissionOutcome::Queued {
                patient_id,
                reason,
                pending,
                persisted,
                ..
            }) => {
                println!("⚠️  Dashboard unavailable, {patient_id} queued for retry");
                println!("   Reason: {reason}");
                println!("   Pending records: {pending}");
                if !persisted {
                    println!("   ❗ Queue could not be written to disk; record is held in memory only");
                }
                exit_code::QUEUED
            }
            Err(QuickScanError::Validation(e)) => {
                println!("❌ Session record is not ready for transmission");
                println!("   {e}");
                return Ok(exit_code::VALIDATION);
            }
            Err(e) => {
                println!("❌ Submission failed");
                println!("   Error: {e}");
                return Ok(exit_code::FATAL);
            }
        };

        session.clear_session_data();
        if self.remove_input {
            remove_input(Path::new(&self.record)).await;
        }

        println!();
        Ok(code)
    }
}

async fn read_record(path: &Path) -> crate::domain::Result<SessionRecord> {
    let raw = Zeroizing::new(tokio::fs::read_to_string(path).await?);
    Ok(serde_json::from_str(&raw)?)
}

async fn remove_input(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => println!("   Removed {}", path.display()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove record file");
            println!("   ⚠️  Could not remove {}: {e}", path.display());
        }
    }
}
