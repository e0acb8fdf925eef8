//! Core business logic for QuickScan.
//!
//! # Modules
//!
//! - [`validation`] - Structural and business checks before a record may leave the device
//! - [`encryption`] - Payload encoding (placeholder base64 or AES-256-GCM)
//! - [`queue`] - Durable offline queue with retry accounting
//! - [`session`] - Live session ownership and the disposal timer
//! - [`transmission`] - Orchestration of submit and drain
//!
//! # Submission Workflow
//!
//! 1. **Validate**: Reject incomplete records; nothing is sent or queued
//! 2. **Encode**: Build the payload right before sending
//! 3. **Send**: One request to the dashboard
//! 4. **Dispose** on success: the session is cleared after the grace period
//! 5. **Queue** on transport failure: a snapshot waits for the next drain
//!
//! # Example
//!
//! ```rust,no_run
//! use quickscan::config::load_config;
//! use quickscan::core::session::SessionStore;
//! use quickscan::core::transmission::{SubmissionOutcome, TransmissionCoordinator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quickscan.toml")?;
//! let coordinator = TransmissionCoordinator::from_config(&config).await?;
//!
//! let session = SessionStore::new();
//! session.start_new_patient();
//! // ... intake and captures fill the session ...
//!
//! match coordinator.submit(&session).await? {
//!     SubmissionOutcome::Succeeded { patient_id, .. } => println!("Sent {patient_id}"),
//!     SubmissionOutcome::Queued { pending, .. } => println!("Queued ({pending} pending)"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod encryption;
pub mod queue;
pub mod session;
pub mod transmission;
pub mod validation;
