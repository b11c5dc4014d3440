use std::{collections::BTreeMap, sync::RwLock};

use async_trait::async_trait;

use crate::ports::object_storage::{ObjectStorage, ObjectStorageError};

/// Object storage kept in the process memory, used to run the service without an S3 backend
///
/// Keys are listed in lexicographic order, like S3 does.
/// Presigned links use the `memory://` scheme and are not retrievable over HTTP.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: String,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored object at `key`, if any
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().ok()?.get(key).cloned()
    }

    /// Snapshot of all the keys, in lexicographic order
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn poisoned_lock() -> ObjectStorageError {
    ObjectStorageError::Other(anyhow::anyhow!("In-memory object storage lock is poisoned"))
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ObjectStorageError> {
        let objects = self.objects.read().map_err(|_| poisoned_lock())?;

        Ok(objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStorageError> {
        let objects = self.objects.read().map_err(|_| poisoned_lock())?;

        objects
            .get(key)
            .map(|object| object.content.clone())
            .ok_or_else(|| ObjectStorageError::ObjectNotFound(key.to_string()))
    }

    async fn put_object(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStorageError> {
        let mut objects = self.objects.write().map_err(|_| poisoned_lock())?;

        objects.insert(
            key.to_string(),
            StoredObject {
                content: content.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn presigned_get_url(&self, key: &str, expiry_seconds: u32) -> Result<String, ObjectStorageError> {
        let objects = self.objects.read().map_err(|_| poisoned_lock())?;
        if !objects.contains_key(key) {
            return Err(ObjectStorageError::ObjectNotFound(key.to_string()));
        }

        Ok(format!("memory://{}?expires_in={}", key, expiry_seconds))
    }
}
