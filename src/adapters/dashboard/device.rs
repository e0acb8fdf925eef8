//! Persisted device identity

use crate::adapters::storage::Storage;
use crate::domain::{DeviceId, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Storage key the device identifier is kept under
pub const DEVICE_ID_KEY: &str = "mkm-quickscan-device-id";

/// Lazily created, persisted device identifier
///
/// The first call to [`DeviceIdentity::get`] loads the identifier from
/// storage or generates and stores a new one; later calls return the cached
/// value without touching storage.
pub struct DeviceIdentity {
    storage: Arc<dyn Storage>,
    cached: OnceCell<DeviceId>,
}

impl DeviceIdentity {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            cached: OnceCell::new(),
        }
    }

    /// Returns the device identifier, creating it on first use
    ///
    /// A generated identifier that cannot be persisted is still used for the
    /// lifetime of this process.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored identifier cannot be read.
    pub async fn get(&self) -> Result<DeviceId> {
        self.cached
            .get_or_try_init(|| self.load_or_create())
            .await
            .cloned()
    }

    async fn load_or_create(&self) -> Result<DeviceId> {
        if let Some(stored) = self.storage.get(DEVICE_ID_KEY).await? {
            match DeviceId::new(stored.trim()) {
                Ok(id) => return Ok(id),
                Err(e) => tracing::warn!(error = %e, "Stored device ID is unusable, generating a new one"),
            }
        }

        let id = DeviceId::generate();
        if let Err(e) = self.storage.put(DEVICE_ID_KEY, id.as_str()).await {
            tracing::warn!(device_id = %id, error = %e, "Failed to persist device ID");
        } else {
            tracing::info!(device_id = %id, "Generated new device ID");
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;

    #[tokio::test]
    async fn test_device_id_generated_and_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let identity = DeviceIdentity::new(storage.clone());

        let id = identity.get().await.unwrap();
        assert!(id.as_str().starts_with("DEVICE_"));
        assert_eq!(
            storage.get(DEVICE_ID_KEY).await.unwrap().as_deref(),
            Some(id.as_str())
        );
    }

    #[tokio::test]
    async fn test_device_id_cached_per_process() {
        let storage = Arc::new(MemoryStorage::new());
        let identity = DeviceIdentity::new(storage.clone());

        let first = identity.get().await.unwrap();
        let writes = storage.write_count();
        let second = identity.get().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_device_id_reused_across_instances() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .put(DEVICE_ID_KEY, "DEVICE_1700000000000_abc123")
            .await
            .unwrap();

        let identity = DeviceIdentity::new(storage);
        assert_eq!(
            identity.get().await.unwrap().as_str(),
            "DEVICE_1700000000000_abc123"
        );
    }

    #[tokio::test]
    async fn test_device_id_survives_persist_failure() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_fail_writes(true);
        let identity = DeviceIdentity::new(storage);

        let first = identity.get().await.unwrap();
        assert_eq!(identity.get().await.unwrap(), first);
    }
}
