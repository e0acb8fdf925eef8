//! External system integrations for QuickScan.
//!
//! - [`dashboard`] - Remote dashboard transport and device identity
//! - [`storage`] - Durable key/value storage (file-backed and in-memory)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits ([`dashboard::Transport`],
//! [`storage::Storage`]) so the core can be tested with in-memory implementations.
//!
//! ```rust,no_run
//! use quickscan::adapters::dashboard::{DeviceIdentity, HttpTransport, Transport};
//! use quickscan::adapters::storage::FileStorage;
//! use quickscan::config::DashboardConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::open("./data").await?);
//! let device = DeviceIdentity::new(storage).get().await?;
//! let transport = HttpTransport::new(&DashboardConfig::default())?;
//! println!("{device} -> {}", transport.endpoint());
//! # Ok(())
//! # }
//! ```

pub mod dashboard;
pub mod storage;
