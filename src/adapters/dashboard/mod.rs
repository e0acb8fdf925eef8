//! QuickScan dashboard integration
//!
//! - [`client`] - HTTP transport and the [`Transport`] seam
//! - [`models`] - Request and acknowledgement wire types
//! - [`device`] - Persisted device identifier sent with every request

pub mod client;
pub mod device;
pub mod models;

pub use client::{HttpTransport, Transport, DEVICE_TYPE_HEADER, VERSION_HEADER};
pub use device::{DeviceIdentity, DEVICE_ID_KEY};
pub use models::{TransmissionAck, TransmissionMetadata, TransmitRequest};
