//! Fakes of the ports shared by the use case tests

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    domain::entities::face_embedding::FaceEmbedding,
    ports::{
        face_embedding_extractor::{FaceEmbeddingExtractor, FaceEmbeddingExtractorError},
        object_storage::{ObjectStorage, ObjectStorageError},
    },
    repositories::in_memory_object_storage::InMemoryObjectStorage,
};

/// In-memory storage where some keys fail, and which counts the calls it receives
#[derive(Default)]
pub struct FlakyObjectStorage {
    pub inner: InMemoryObjectStorage,
    failing_gets: HashSet<String>,
    /// Destination keys containing one of these strings fail to be written
    failing_puts: Vec<String>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
}

impl FlakyObjectStorage {
    pub async fn with_objects(objects: &[(&str, &[u8])]) -> Self {
        let storage = Self::default();
        for (key, content) in objects {
            storage
                .inner
                .put_object(key, content, "image/jpeg")
                .await
                .unwrap();
        }
        storage
    }

    pub fn failing_get(mut self, key: &str) -> Self {
        self.failing_gets.insert(key.to_string());
        self
    }

    pub fn failing_put(mut self, key_part: &str) -> Self {
        self.failing_puts.push(key_part.to_string());
        self
    }

    pub fn calls(&self) -> (usize, usize) {
        (
            self.list_calls.load(Ordering::SeqCst),
            self.get_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl ObjectStorage for FlakyObjectStorage {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ObjectStorageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_keys(prefix).await
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStorageError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_gets.contains(key) {
            return Err(anyhow::anyhow!("connection reset while downloading {}", key).into());
        }
        self.inner.get_object(key).await
    }

    async fn put_object(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStorageError> {
        if self.failing_puts.iter().any(|part| key.contains(part)) {
            return Err(anyhow::anyhow!("access denied on {}", key).into());
        }
        self.inner.put_object(key, content, content_type).await
    }

    fn presigned_get_url(&self, key: &str, expiry_seconds: u32) -> Result<String, ObjectStorageError> {
        self.inner.presigned_get_url(key, expiry_seconds)
    }
}

/// Embeddings decided in advance for each image content. Unknown contents have no face.
#[derive(Default)]
pub struct ScriptedFaceEmbeddingExtractor {
    embeddings: HashMap<Vec<u8>, Vec<f32>>,
    failing: HashSet<Vec<u8>>,
    pub calls: AtomicUsize,
}

impl ScriptedFaceEmbeddingExtractor {
    pub fn with_face(mut self, image: &[u8], embedding: &[f32]) -> Self {
        self.embeddings.insert(image.to_vec(), embedding.to_vec());
        self
    }

    /// The model crashes on this image
    pub fn with_model_error(mut self, image: &[u8]) -> Self {
        self.failing.insert(image.to_vec());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FaceEmbeddingExtractor for ScriptedFaceEmbeddingExtractor {
    async fn extract(&self, image: &[u8]) -> Result<FaceEmbedding, FaceEmbeddingExtractorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(image) {
            return Err(anyhow::anyhow!("model inference failed").into());
        }

        let values = self
            .embeddings
            .get(image)
            .ok_or(FaceEmbeddingExtractorError::NoFaceDetected)?;

        FaceEmbedding::parse(values.clone())
            .map_err(|error| FaceEmbeddingExtractorError::InvalidEmbedding(error.to_string()))
    }
}
