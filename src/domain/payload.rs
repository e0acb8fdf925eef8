//! Encrypted transmission payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Encoded form of exactly one session record
///
/// Built immediately before a transport call and dropped right after it.
/// Never persisted; the offline queue stores the plain record and re-encodes
/// on every attempt. The ciphertext buffer is wiped on drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    /// Encoded record
    pub encrypted: String,

    /// Scheme name, e.g. `aes-256-gcm`
    #[zeroize(skip)]
    pub algorithm: String,

    /// When the payload was produced
    #[zeroize(skip)]
    pub timestamp: DateTime<Utc>,
}

impl EncryptedPayload {
    pub fn new(encrypted: String, algorithm: impl Into<String>) -> Self {
        Self {
            encrypted,
            algorithm: algorithm.into(),
            timestamp: Utc::now(),
        }
    }
}
