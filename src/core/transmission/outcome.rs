//! Submission states and outcomes

use crate::adapters::dashboard::TransmissionAck;
use crate::domain::PatientId;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Progress of the submission currently handled by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Encoding,
    Sending,
    Succeeded,
    Queued,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Encoding => "encoding",
            SubmissionState::Sending => "sending",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::Queued => "queued",
        };
        f.write_str(name)
    }
}

/// Non-error result of [`submit`](super::TransmissionCoordinator::submit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The dashboard confirmed receipt; the session is scheduled for disposal
    Succeeded {
        patient_id: PatientId,
        ack: TransmissionAck,
    },

    /// Delivery failed and the record was queued for retry
    Queued {
        patient_id: PatientId,
        entry_id: Uuid,
        reason: String,
        /// Entries waiting in the queue, including this one
        pending: usize,
        /// Whether the queue snapshot reached durable storage
        persisted: bool,
    },
}

impl SubmissionOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, SubmissionOutcome::Queued { .. })
    }

    pub fn patient_id(&self) -> &PatientId {
        match self {
            SubmissionOutcome::Succeeded { patient_id, .. }
            | SubmissionOutcome::Queued { patient_id, .. } => patient_id,
        }
    }
}

/// One queued entry as shown by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedItem {
    pub entry_id: Uuid,
    pub patient_id: String,
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
}

/// Snapshot of the offline queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    pub items: Vec<QueuedItem>,
    pub max_retries: u32,
    pub persisted: bool,
}

impl QueueStatus {
    pub fn pending(&self) -> usize {
        self.items.len()
    }

    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.items.iter().map(|item| item.enqueued_at).min()
    }
}
