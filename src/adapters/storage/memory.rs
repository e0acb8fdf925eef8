//! In-memory storage backend
//!
//! Used by tests and by callers that do not need persistence across
//! restarts. Writes can be made to fail on demand to exercise the queue's
//! persistence-failure path.

use super::traits::Storage;
use crate::domain::{QuickScanError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Storage backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `put` and `remove` calls fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `put` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.documents
            .lock()
            .map_err(|_| QuickScanError::Storage("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(QuickScanError::Storage(format!(
                "write to '{key}' rejected"
            )));
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(QuickScanError::Storage(format!(
                "removal of '{key}' rejected"
            )));
        }
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.put("k", "[1,2]").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(storage.write_count(), 1);

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failing_writes_keep_previous_value() {
        let storage = MemoryStorage::new();
        storage.put("k", "old").await.unwrap();

        storage.set_fail_writes(true);
        assert!(storage.put("k", "new").await.is_err());
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("old"));

        storage.set_fail_writes(false);
        storage.put("k", "new").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
