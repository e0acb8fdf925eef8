//! Domain error types
//!
//! This module defines the error hierarchy for QuickScan. Boundary failures
//! (network, storage, serialization) are converted into these types so no
//! third-party error type leaks out of the adapters.

use crate::domain::session::TestKind;
use thiserror::Error;

/// Main QuickScan error type
///
/// This is the primary error type used throughout the crate.
/// It wraps the component error types and adds context for the rest.
#[derive(Debug, Error)]
pub enum QuickScanError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Session record failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Dashboard transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Offline queue errors
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Durable storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Payload encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl QuickScanError {
    /// Whether a failed submission should be placed on the offline queue
    ///
    /// Only transport failures are recoverable. Validation failures are
    /// terminal for the submission and everything else is a local fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuickScanError::Transport(_))
    }
}

/// Session record validation failures
///
/// Each variant names exactly what is wrong so callers can surface a
/// specific message instead of a generic "invalid record".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required top-level field is absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The patient identifier is not a de-identified temporary code
    #[error("Invalid de-identified patient code: {0}")]
    InvalidIdentifier(String),

    /// Nickname, gender or age group is not filled in
    #[error("Basic information is incomplete")]
    IncompleteBasicInfo,

    /// A diagnostic test has not passed its quality gate
    #[error("{0} test is not complete")]
    IncompleteTest(TestKind),
}

/// Dashboard transport failures
///
/// These errors don't expose the HTTP client's types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The dashboard answered with a non-success status
    #[error("Dashboard rejected transmission: {status_code} - {message}")]
    RemoteRejected { status_code: u16, message: String },

    /// The dashboard could not be reached
    #[error("Dashboard unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete within the configured timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Offline queue failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue snapshot could not be written to durable storage
    #[error("Failed to persist offline queue: {0}")]
    PersistFailure(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for QuickScanError {
    fn from(err: std::io::Error) -> Self {
        QuickScanError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for QuickScanError {
    fn from(err: serde_json::Error) -> Self {
        QuickScanError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for QuickScanError {
    fn from(err: toml::de::Error) -> Self {
        QuickScanError::Configuration(format!("TOML parse error: {err}"))
    }
}
