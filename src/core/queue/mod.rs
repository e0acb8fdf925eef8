//! Offline transmission queue
//!
//! - [`entry`] - Queue entries and the persisted document format
//! - [`offline`] - The queue itself and its drain pass

pub mod entry;
pub mod offline;

pub use entry::{QueueEntry, SCHEMA_VERSION};
pub use offline::{DrainReport, OfflineQueue, RecordSender, DEFAULT_MAX_RETRIES, QUEUE_KEY};
