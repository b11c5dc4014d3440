use common::helper::error_chain_fmt;

/// Identity-relevant features of one detected face (ex: 512 values for ArcFace).
///
/// Immutable once parsed, and only compared to other embeddings through
/// [`FaceEmbedding::cosine_distance`].
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEmbedding(Vec<f32>);

impl FaceEmbedding {
    /// Validates raw model output: at least one value, and only finite values
    pub fn parse(values: Vec<f32>) -> Result<Self, FaceEmbeddingError> {
        if values.is_empty() {
            return Err(FaceEmbeddingError::Empty);
        }

        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(FaceEmbeddingError::NonFiniteValue(index));
        }

        Ok(Self(values))
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// 1 - cosine similarity, in `[0, 2]`
    ///
    /// Computed in f64 from end to end, neighbor thresholds are compared against it as is.
    /// A zero vector has a similarity of 0 with anything.
    pub fn cosine_distance(&self, other: &FaceEmbedding) -> f64 {
        let mut dot = 0.0_f64;
        let mut norm_a = 0.0_f64;
        let mut norm_b = 0.0_f64;

        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let (a, b) = (*a as f64, *b as f64);
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denominator = norm_a.sqrt() * norm_b.sqrt();
        let similarity = if denominator == 0.0 {
            0.0
        } else {
            (dot / denominator).clamp(-1.0, 1.0)
        };

        1.0 - similarity
    }
}

impl AsRef<[f32]> for FaceEmbedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[derive(thiserror::Error)]
pub enum FaceEmbeddingError {
    #[error("An embedding must contain at least one value")]
    Empty,
    #[error("The embedding value at index {0} is not a finite number")]
    NonFiniteValue(usize),
}

impl std::fmt::Debug for FaceEmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
