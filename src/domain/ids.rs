//! Domain identifier types
//!
//! Newtype wrappers for the two generated identifiers QuickScan deals with:
//! the temporary de-identified patient code and the device identifier.

use chrono::{DateTime, Local, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use zeroize::Zeroize;

/// Prefix every de-identified patient code carries
pub const PATIENT_ID_PREFIX: &str = "TEMP_";

/// Prefix every device identifier carries
pub const DEVICE_ID_PREFIX: &str = "DEVICE_";

const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE36_LOWER: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn patient_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^TEMP_\d{8}_\d{6}_[A-Z0-9]{6}$").expect("patient id pattern is valid")
    })
}

fn random_chars(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Temporary de-identified patient code
///
/// Format: `TEMP_YYYYMMDD_HHMMSS_XXXXXX` where the suffix is six random
/// uppercase base-36 characters. The code is generated once when a new
/// patient session starts and never changes afterwards.
///
/// Deserialization accepts any string so that records loaded from disk can be
/// checked by the validator instead of failing to parse.
///
/// # Examples
///
/// ```
/// use quickscan::domain::ids::PatientId;
///
/// let id = PatientId::generate();
/// assert!(id.is_well_formed());
/// assert!(id.as_str().starts_with("TEMP_"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Zeroize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Generate a new code stamped with the current local time
    pub fn generate() -> Self {
        Self::generate_at(Local::now())
    }

    /// Generate a new code stamped with the given time
    pub fn generate_at(now: DateTime<Local>) -> Self {
        Self(format!(
            "{}{}_{}",
            PATIENT_ID_PREFIX,
            now.format("%Y%m%d_%H%M%S"),
            random_chars(BASE36_UPPER, 6)
        ))
    }

    /// Parse a strictly formatted code
    ///
    /// # Errors
    ///
    /// Returns an error message if the string does not match the
    /// `TEMP_YYYYMMDD_HHMMSS_XXXXXX` format.
    pub fn parse(id: impl Into<String>) -> Result<Self, String> {
        let id = Self(id.into());
        if !id.is_well_formed() {
            return Err(format!(
                "Invalid patient code format. Expected TEMP_YYYYMMDD_HHMMSS_XXXXXX, got: {}",
                id.0
            ));
        }
        Ok(id)
    }

    /// Wrap a string without checking its format
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether the code carries the de-identification prefix
    pub fn has_deidentified_prefix(&self) -> bool {
        self.0.starts_with(PATIENT_ID_PREFIX)
    }

    /// Whether the code matches the full generated format
    pub fn is_well_formed(&self) -> bool {
        patient_id_pattern().is_match(&self.0)
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is empty
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stable identifier for the device running the relay
///
/// Format: `DEVICE_<epochMillis>_<random6>` with a lowercase base-36 suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Generate a fresh identifier from the current time
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate a fresh identifier from the given time
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        Self(format!(
            "{}{}_{}",
            DEVICE_ID_PREFIX,
            now.timestamp_millis(),
            random_chars(BASE36_LOWER, 6)
        ))
    }

    /// Wrap a previously persisted identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Device ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
