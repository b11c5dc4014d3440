use common::helper::error_chain_fmt;

use crate::domain::entities::{cluster_labeling::ClusterLabeling, embedding_set::EmbeddingSet};

/// Groups the embeddings of a set by similarity
///
/// The returned labeling has exactly one label per entry of `embeddings`, in the same order.
pub trait PartitionClusterer: Send + Sync {
    fn partition(&self, embeddings: &EmbeddingSet) -> Result<ClusterLabeling, ClusteringError>;
}

#[derive(thiserror::Error)]
pub enum ClusteringError {
    #[error("Invalid clustering parameter: {0}")]
    InvalidParameter(String),
    #[error("Embeddings of different dimensions cannot be clustered together: {0} and {1}")]
    DimensionMismatch(usize, usize),
}

impl std::fmt::Debug for ClusteringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
