use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::face_embedding::FaceEmbedding;

/// Turns the primary face of an image into an embedding
///
/// The image is only borrowed: the caller keeps the same bytes to re-upload them later.
/// Implementations are shared by all the requests and must not keep per-call state.
#[async_trait]
pub trait FaceEmbeddingExtractor: Send + Sync {
    async fn extract(&self, image: &[u8]) -> Result<FaceEmbedding, FaceEmbeddingExtractorError>;
}

#[derive(thiserror::Error)]
pub enum FaceEmbeddingExtractorError {
    #[error("No face detected in the image")]
    NoFaceDetected,
    #[error("Invalid embedding returned by the model: {0}")]
    InvalidEmbedding(String),
    #[error(transparent)]
    ModelError(#[from] anyhow::Error),
}

impl std::fmt::Debug for FaceEmbeddingExtractorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
