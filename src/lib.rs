// QuickScan - Offline-first relay for de-identified scan sessions
// Copyright (c) 2025 QuickScan Contributors
// Licensed under the MIT License

//! # QuickScan - Offline-first session relay
//!
//! QuickScan delivers de-identified diagnostic session records (tongue, face
//! and voice captures collected by a nurse assistant) to a remote dashboard.
//! Records that cannot be delivered are kept in a durable offline queue and
//! re-sent later, at least once, until they are delivered or run out of
//! retries.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Owning** the live session record and disposing of it after delivery
//! - **Validating** a record before it may leave the device
//! - **Encoding** the record into a transmission payload
//! - **Queueing** records that could not be delivered, across restarts
//! - **Draining** the queue with bounded per-record retries
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (validation, encryption, queue, session, transmission)
//! - [`adapters`] - External integrations (dashboard HTTP API, durable storage)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quickscan::config::load_config;
//! use quickscan::core::session::SessionStore;
//! use quickscan::core::transmission::TransmissionCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("quickscan.toml")?;
//!     let coordinator = TransmissionCoordinator::from_config(&config).await?;
//!
//!     let session = SessionStore::new();
//!     session.start_new_patient();
//!
//!     // Incomplete records are rejected before anything is sent
//!     if let Err(e) = coordinator.submit(&session).await {
//!         println!("Not ready: {e}");
//!     }
//!
//!     let report = coordinator.drain_queue().await;
//!     println!("Re-sent {} queued record(s)", report.transmitted);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error type is
//! [`domain::QuickScanError`]. Only transport failures are recoverable; they
//! send the record to the offline queue instead of surfacing as an error.
//!
//! ## Logging
//!
//! QuickScan logs through `tracing`. Log events carry the de-identified
//! patient code but never record contents.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
