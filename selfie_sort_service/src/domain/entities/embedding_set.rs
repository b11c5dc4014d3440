use common::helper::error_chain_fmt;

use super::face_embedding::FaceEmbedding;

/// Where an embedding of an [`EmbeddingSet`] comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingRole {
    /// The face submitted by the attendee
    Selfie,
    /// A stored photographer image, identified by its storage key
    Candidate(String),
}

#[derive(Debug, Clone)]
pub struct TaggedEmbedding {
    pub role: EmbeddingRole,
    pub embedding: FaceEmbedding,
}

/// Ordered embeddings of one matching request: the selfie first, then the candidates in collection order.
///
/// The order is the only link between a cluster label and the image it was computed for:
/// the n-th label of a `ClusterLabeling` belongs to the n-th entry of the set.
/// The set can only be created from a selfie, so there is always exactly one `Selfie` entry.
#[derive(Debug, Clone)]
pub struct EmbeddingSet {
    entries: Vec<TaggedEmbedding>,
}

impl EmbeddingSet {
    pub fn new(selfie: FaceEmbedding) -> Self {
        Self {
            entries: vec![TaggedEmbedding {
                role: EmbeddingRole::Selfie,
                embedding: selfie,
            }],
        }
    }

    /// Appends a candidate after the already added entries
    ///
    /// Rejects an embedding whose dimension differs from the selfie's: it comes from another model
    /// and cannot be compared.
    pub fn push_candidate(
        &mut self,
        key: impl Into<String>,
        embedding: FaceEmbedding,
    ) -> Result<(), EmbeddingSetError> {
        let key = key.into();
        let expected = self.dimension();

        if embedding.dimension() != expected {
            return Err(EmbeddingSetError::DimensionMismatch {
                key,
                expected,
                found: embedding.dimension(),
            });
        }

        self.entries.push(TaggedEmbedding {
            role: EmbeddingRole::Candidate(key),
            embedding,
        });
        Ok(())
    }

    pub fn entries(&self) -> &[TaggedEmbedding] {
        &self.entries
    }

    pub fn embeddings(&self) -> impl Iterator<Item = &FaceEmbedding> {
        self.entries.iter().map(|entry| &entry.embedding)
    }

    /// Dimension shared by every embedding of the set
    pub fn dimension(&self) -> usize {
        self.entries[0].embedding.dimension()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, a set holds at least the selfie
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.entries.len() - 1
    }
}

#[derive(thiserror::Error)]
pub enum EmbeddingSetError {
    #[error("The embedding of {key} has {found} dimensions, {expected} were expected")]
    DimensionMismatch {
        key: String,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Debug for EmbeddingSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
