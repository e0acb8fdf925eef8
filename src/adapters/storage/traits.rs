//! Durable storage abstraction
//!
//! This module defines the key/value capability that the offline queue and
//! the device identity persist through. Values are whole JSON documents that
//! are read and replaced as a unit.

use crate::domain::Result;
use async_trait::async_trait;

/// Durable key/value storage
///
/// Implementations must make [`Storage::put`] atomic from the reader's point
/// of view: a concurrent or subsequent [`Storage::get`] sees either the old
/// document or the new one, never a mix.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the document stored under `key`
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the document stored under `key`; missing keys are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be removed.
    async fn remove(&self, key: &str) -> Result<()>;
}
