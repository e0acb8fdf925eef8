//! Domain models and types for QuickScan.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Generated identifiers** ([`PatientId`], [`DeviceId`])
//! - **The session record** ([`SessionRecord`]) and its parts
//! - **The transmission payload** ([`EncryptedPayload`])
//! - **Error types** ([`QuickScanError`], [`ValidationError`], [`TransportError`], [`QueueError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use quickscan::domain::{Quality, SessionRecord, TestKind};
//!
//! let mut record = SessionRecord::start_new();
//! record.set_test_quality(TestKind::Tongue, Quality::Ok);
//! assert!(!record.is_all_tests_complete());
//! ```

pub mod errors;
pub mod ids;
pub mod payload;
pub mod result;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types for convenience
pub use errors::{QueueError, QuickScanError, TransportError, ValidationError};
pub use ids::{DeviceId, PatientId};
pub use payload::EncryptedPayload;
pub use result::Result;
pub use session::{
    AgeGroup, BasicInfo, BasicInfoUpdate, CaptureHandle, Gender, Quality, SessionRecord, TestKind,
    TestResult, TestResultUpdate,
};
