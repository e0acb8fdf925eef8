//! Queue entries and the persisted queue document

use crate::domain::SessionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current version of the persisted queue document
pub const SCHEMA_VERSION: u32 = 1;

/// A session record snapshot waiting for delivery
///
/// The record's fields are stored inline next to the bookkeeping fields, so
/// documents written by earlier clients (a bare array of records carrying
/// `queuedAt` and `retryCount`) load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Correlates log lines for one entry; assigned on load for legacy entries
    #[serde(default = "Uuid::new_v4")]
    pub entry_id: Uuid,

    #[serde(flatten)]
    pub record: SessionRecord,

    #[serde(alias = "queuedAt", default = "Utc::now")]
    pub enqueued_at: DateTime<Utc>,

    /// Failed drain attempts so far
    #[serde(default)]
    pub retry_count: u32,
}

impl QueueEntry {
    /// Wrap a record snapshot with `retry_count = 0`
    pub fn new(record: SessionRecord) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            record,
            enqueued_at: Utc::now(),
            retry_count: 0,
        }
    }

    pub fn patient_label(&self) -> &str {
        self.record.patient_label()
    }
}

/// Versioned queue document as written to storage
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDocument<'a> {
    pub schema_version: u32,
    pub entries: &'a [QueueEntry],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionedDocument {
    schema_version: u32,
    #[serde(default)]
    entries: Vec<QueueEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredQueue {
    Versioned(VersionedDocument),
    Legacy(Vec<QueueEntry>),
}

/// Serialize entries as the current document version
pub fn encode_document(entries: &[QueueEntry]) -> serde_json::Result<String> {
    serde_json::to_string(&QueueDocument {
        schema_version: SCHEMA_VERSION,
        entries,
    })
}

/// Parse a stored document, accepting the legacy bare-array form
///
/// # Errors
///
/// Returns a description of the problem for malformed JSON or a schema
/// version newer than this build understands.
pub fn decode_document(raw: &str) -> Result<Vec<QueueEntry>, String> {
    let stored: StoredQueue =
        serde_json::from_str(raw).map_err(|e| format!("malformed queue document: {e}"))?;

    match stored {
        StoredQueue::Legacy(entries) => Ok(entries),
        StoredQueue::Versioned(doc) if doc.schema_version <= SCHEMA_VERSION => Ok(doc.entries),
        StoredQueue::Versioned(doc) => Err(format!(
            "unsupported queue schema version {} (supported: {})",
            doc.schema_version, SCHEMA_VERSION
        )),
    }
}
