use async_trait::async_trait;
use s3::{error::S3Error, Bucket};
use tracing::info;

use crate::ports::object_storage::{ObjectStorage, ObjectStorageError};

/// Simple Storage Service (S3) client holding the photographer uploads and the matched photos
pub struct ObjectStorageS3Repository {
    // All the keys of the service live in the bucket of the environment
    bucket: Bucket,
}

impl ObjectStorageS3Repository {
    pub fn new(bucket: Bucket) -> Self {
        Self { bucket }
    }
}

/// Maps a 404 to `ObjectNotFound`, anything else is kept as an opaque storage error
fn map_s3_error(error: S3Error, key: &str) -> ObjectStorageError {
    match error {
        S3Error::Http(404, _) => ObjectStorageError::ObjectNotFound(key.to_string()),
        _ => ObjectStorageError::Other(anyhow::Error::new(error)),
    }
}

#[async_trait]
impl ObjectStorage for ObjectStorageS3Repository {
    #[tracing::instrument(name = "Listing objects from bucket", skip(self))]
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ObjectStorageError> {
        // One result per page of the listing, already followed by rust-s3
        let pages = self
            .bucket
            .list(prefix.to_string(), None)
            .await
            .map_err(|error| map_s3_error(error, prefix))?;

        let keys: Vec<String> = pages
            .into_iter()
            .flat_map(|page| page.contents.into_iter().map(|object| object.key))
            .collect();

        info!("Listed {} objects under {}", keys.len(), prefix);
        Ok(keys)
    }

    #[tracing::instrument(name = "Getting object from bucket", skip(self))]
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStorageError> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|error| map_s3_error(error, key))?;

        Ok(response.bytes().to_vec())
    }

    #[tracing::instrument(name = "Putting object to bucket", skip(self, content), fields(size = content.len()))]
    async fn put_object(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStorageError> {
        self.bucket
            .put_object_with_content_type(key, content, content_type)
            .await
            .map_err(|error| map_s3_error(error, key))?;

        info!("Saved object at {}", key);
        Ok(())
    }

    #[tracing::instrument(name = "Presigning object url", skip(self))]
    fn presigned_get_url(&self, key: &str, expiry_seconds: u32) -> Result<String, ObjectStorageError> {
        self.bucket
            .presign_get(key, expiry_seconds, None)
            .map_err(|error| map_s3_error(error, key))
    }
}
