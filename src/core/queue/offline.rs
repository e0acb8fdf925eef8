//! Durable offline transmission queue
//!
//! Records that could not be delivered are kept here and re-sent on every
//! drain until they succeed or run out of attempts. Delivery is
//! at-least-once: the queue is persisted once after a full drain pass, so a
//! crash mid-pass can re-send records the dashboard already accepted.

use super::entry::{decode_document, encode_document, QueueEntry};
use crate::adapters::storage::Storage;
use crate::config::DrainOrder;
use crate::domain::{QueueError, QuickScanError, SessionRecord};
use crate::{log_entry_dropped, log_retry_attempt};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Storage key the queue document is kept under
pub const QUEUE_KEY: &str = "mkm-quickscan-offline-queue";

/// Failed drain attempts after which an entry is dropped
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// One delivery attempt for a queued record
///
/// Implemented by the transmission coordinator (encode then send). Queued
/// records are not re-validated.
#[async_trait]
pub trait RecordSender: Send + Sync {
    /// # Errors
    ///
    /// Any error counts as a failed attempt for the entry.
    async fn send_record(&self, record: &SessionRecord) -> Result<(), QuickScanError>;
}

/// Outcome of one drain pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries delivered and removed
    pub transmitted: usize,

    /// Entries that failed and stay queued with a higher retry count
    pub retried: usize,

    /// Entries dropped after exhausting their retries, by patient code or
    /// `entry <id>` when the record carries no patient code
    pub dropped: Vec<String>,

    /// Entries left in the queue after the pass
    pub remaining: usize,

    /// Whether the post-pass snapshot reached durable storage
    pub persisted: bool,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.retried == 0 && self.dropped.is_empty() && self.persisted
    }
}

/// Persistent queue of records awaiting delivery
///
/// The in-memory entry list is authoritative. When a write to storage fails
/// the queue stays marked dirty and the next mutation writes the full
/// snapshot again.
pub struct OfflineQueue {
    storage: Arc<dyn Storage>,
    key: String,
    max_retries: u32,
    drain_order: DrainOrder,
    entries: Vec<QueueEntry>,
    dirty: bool,
}

impl OfflineQueue {
    /// Load the queue stored under `key`
    ///
    /// An unreadable or malformed document is logged and the queue starts
    /// empty. A malformed document is moved to `<key>.corrupt` so it can be
    /// inspected; the original is kept if the backup cannot be written.
    pub async fn open(
        storage: Arc<dyn Storage>,
        key: impl Into<String>,
        max_retries: u32,
        drain_order: DrainOrder,
    ) -> Self {
        let key = key.into();
        let entries = match storage.get(&key).await {
            Ok(Some(raw)) => match decode_document(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Offline queue document is unreadable, starting empty");
                    move_to_backup(storage.as_ref(), &key, &raw).await;
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to load offline queue, starting empty");
                Vec::new()
            }
        };

        if !entries.is_empty() {
            tracing::info!(pending = entries.len(), "Loaded offline queue");
        }

        Self {
            storage,
            key,
            max_retries: max_retries.max(1),
            drain_order,
            entries,
            dirty: false,
        }
    }

    /// Append a snapshot of `record` and persist the queue
    ///
    /// The entry is kept even if persisting fails; check
    /// [`OfflineQueue::is_persisted`] to learn whether it is durable.
    pub async fn enqueue(&mut self, record: SessionRecord) -> Uuid {
        let entry = QueueEntry::new(record);
        let entry_id = entry.entry_id;

        tracing::debug!(
            entry_id = %entry_id,
            patient_id = %entry.patient_label(),
            "Adding record to offline queue"
        );
        self.entries.push(entry);
        let _ = self.persist().await;

        entry_id
    }

    /// Try to deliver every queued entry once
    ///
    /// Successful entries are removed. Failed entries have their retry count
    /// incremented and are dropped, with an error log, once it reaches the
    /// retry limit. The queue is persisted once after the pass.
    pub async fn drain<S>(&mut self, sender: &S) -> DrainReport
    where
        S: RecordSender + ?Sized,
    {
        let mut report = DrainReport::default();
        if self.entries.is_empty() {
            if self.dirty {
                report.persisted = self.persist().await.is_ok();
            } else {
                report.persisted = true;
            }
            return report;
        }

        tracing::info!(
            pending = self.entries.len(),
            order = %self.drain_order,
            "Draining offline queue"
        );

        let order: Vec<usize> = match self.drain_order {
            DrainOrder::NewestFirst => (0..self.entries.len()).rev().collect(),
            DrainOrder::OldestFirst => (0..self.entries.len()).collect(),
        };
        let mut keep = vec![true; self.entries.len()];

        for index in order {
            let result = sender.send_record(&self.entries[index].record).await;
            let entry = &mut self.entries[index];

            match result {
                Ok(()) => {
                    tracing::info!(
                        entry_id = %entry.entry_id,
                        patient_id = %entry.patient_label(),
                        "Queued record transmitted"
                    );
                    keep[index] = false;
                    report.transmitted += 1;
                }
                Err(e) => {
                    entry.retry_count += 1;
                    if entry.retry_count >= self.max_retries {
                        log_entry_dropped!(entry.patient_label(), entry.retry_count, e);
                        keep[index] = false;
                        report.dropped.push(dropped_label(entry));
                    } else {
                        log_retry_attempt!(
                            entry.patient_label(),
                            entry.retry_count,
                            self.max_retries,
                            e
                        );
                        report.retried += 1;
                    }
                }
            }
        }

        let mut flags = keep.into_iter();
        self.entries.retain(|_| flags.next().unwrap_or(true));

        report.remaining = self.entries.len();
        report.persisted = self.persist().await.is_ok();

        tracing::info!(
            transmitted = report.transmitted,
            retried = report.retried,
            dropped = report.dropped.len(),
            remaining = report.remaining,
            "Offline queue drain finished"
        );

        report
    }

    /// Write the full snapshot to storage
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::PersistFailure`]; the queue stays dirty.
    pub async fn persist(&mut self) -> Result<(), QueueError> {
        let result = match encode_document(&self.entries) {
            Ok(raw) => self
                .storage
                .put(&self.key, &raw)
                .await
                .map_err(|e| QueueError::PersistFailure(e.to_string())),
            Err(e) => Err(QueueError::PersistFailure(e.to_string())),
        };

        match result {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                tracing::error!(
                    key = %self.key,
                    pending = self.entries.len(),
                    error = %e,
                    "Failed to persist offline queue; in-memory queue kept"
                );
                Err(e)
            }
        }
    }

    /// Whether the last write reached storage
    pub fn is_persisted(&self) -> bool {
        !self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in enqueue order
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn drain_order(&self) -> DrainOrder {
        self.drain_order
    }
}

fn dropped_label(entry: &QueueEntry) -> String {
    match &entry.record.patient_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("entry {}", entry.entry_id),
    }
}

async fn move_to_backup(storage: &dyn Storage, key: &str, raw: &str) {
    let backup = format!("{key}.corrupt");
    if let Err(e) = storage.put(&backup, raw).await {
        tracing::warn!(key = %backup, error = %e, "Failed to back up unreadable queue document");
        return;
    }
    match storage.remove(key).await {
        Ok(()) => tracing::info!(key = %backup, "Unreadable queue document moved aside"),
        Err(e) => tracing::warn!(key = %key, error = %e, "Failed to remove unreadable queue document"),
    }
}
