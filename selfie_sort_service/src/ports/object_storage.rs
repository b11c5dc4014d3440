use async_trait::async_trait;
use common::helper::error_chain_fmt;

/// Object storage holding the photographer uploads and the published matches
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Keys of all the objects whose key starts with `prefix`, in the order returned by the storage
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ObjectStorageError>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStorageError>;

    /// Creates or replaces the object at `key`
    async fn put_object(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStorageError>;

    /// Link giving read access to `key` for `expiry_seconds` without credentials
    fn presigned_get_url(&self, key: &str, expiry_seconds: u32) -> Result<String, ObjectStorageError>;
}

#[derive(thiserror::Error)]
pub enum ObjectStorageError {
    #[error("The object could not be found in the bucket: {0}")]
    ObjectNotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for ObjectStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
