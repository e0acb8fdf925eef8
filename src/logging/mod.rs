//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - Human-readable console output
//! - Optional JSON log files with rotation
//! - Log level from configuration, overridable with `RUST_LOG`
//!
//! Patient identifiers are the only record field that ever reaches a log
//! line. Nicknames, symptoms and captures are never logged.
//!
//! # Example
//!
//! ```no_run
//! use quickscan::logging::init_logging;
//! use quickscan::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Relay started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a submission that could not be delivered and was queued
///
/// # Example
///
/// ```no_run
/// use quickscan::log_submission_queued;
///
/// log_submission_queued!("TEMP_20250101_120000_AB12CD", "Dashboard unreachable", 2);
/// ```
#[macro_export]
macro_rules! log_submission_queued {
    ($patient_id:expr, $reason:expr, $pending:expr) => {
        tracing::warn!(
            patient_id = %$patient_id,
            reason = %$reason,
            pending = $pending,
            "Transmission failed, record queued for retry"
        );
    };
}

/// Log a failed delivery attempt for a queued entry
///
/// # Example
///
/// ```no_run
/// use quickscan::log_retry_attempt;
///
/// log_retry_attempt!("TEMP_20250101_120000_AB12CD", 2, 3, "Request timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($patient_id:expr, $attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            patient_id = %$patient_id,
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Queued transmission attempt failed"
        );
    };
}

/// Log a queued entry dropped after exhausting its retries
///
/// This is data loss and is always logged at error level.
///
/// # Example
///
/// ```no_run
/// use quickscan::log_entry_dropped;
///
/// log_entry_dropped!("TEMP_20250101_120000_AB12CD", 3, "Dashboard unreachable");
/// ```
#[macro_export]
macro_rules! log_entry_dropped {
    ($patient_id:expr, $attempts:expr, $reason:expr) => {
        tracing::error!(
            patient_id = %$patient_id,
            attempts = $attempts,
            reason = %$reason,
            "Retry limit reached, queued record dropped"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use quickscan::log_error_with_context;
/// use quickscan::domain::QuickScanError;
///
/// let error = QuickScanError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
