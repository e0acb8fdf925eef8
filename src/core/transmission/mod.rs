//! Transmission of session records to the dashboard
//!
//! - [`coordinator`] - Validate, encode, send, then dispose or queue
//! - [`outcome`] - Submission states, outcomes and queue status snapshots

pub mod coordinator;
pub mod outcome;

pub use coordinator::TransmissionCoordinator;
pub use outcome::{QueueStatus, QueuedItem, SubmissionOutcome, SubmissionState};
