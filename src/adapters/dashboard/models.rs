//! Dashboard wire models

use crate::domain::{DeviceId, EncryptedPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request metadata sent alongside every payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionMetadata {
    pub timestamp: DateTime<Utc>,
    pub device_id: DeviceId,
    pub app_version: String,
}

impl TransmissionMetadata {
    /// Metadata stamped with the current time
    pub fn now(device_id: DeviceId, app_version: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            device_id,
            app_version: app_version.into(),
        }
    }
}

/// Body of `POST {base_url}/quickscan/transmit`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmitRequest<'a> {
    pub encrypted_data: &'a EncryptedPayload,
    pub metadata: &'a TransmissionMetadata,
}

/// Acknowledgement returned by the dashboard on success
///
/// Both fields are optional; an empty or non-JSON success body still counts
/// as a confirmed delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionAck {
    #[serde(default)]
    pub transmission_id: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TransmissionAck {
    /// Parse a success body, falling back to an empty acknowledgement
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}
