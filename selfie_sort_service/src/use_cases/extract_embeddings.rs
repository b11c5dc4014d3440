use futures::{stream, StreamExt};
use tracing::{info, warn};

use crate::{
    domain::entities::{
        candidate_image::CandidateImage, embedding_set::EmbeddingSet,
        face_embedding::FaceEmbedding,
    },
    ports::face_embedding_extractor::{FaceEmbeddingExtractor, FaceEmbeddingExtractorError},
};

/// Embedding of the primary face of `image`, or `None` when none could be produced
///
/// Whatever the reason (no face, model error, unreachable service), the image is only skipped:
/// the error is logged here and never returned.
pub async fn embed_image(
    extractor: &dyn FaceEmbeddingExtractor,
    image_name: &str,
    image: &[u8],
) -> Option<FaceEmbedding> {
    match extractor.extract(image).await {
        Ok(embedding) => Some(embedding),
        Err(FaceEmbeddingExtractorError::NoFaceDetected) => {
            info!(image_name, "No face detected");
            None
        }
        Err(error) => {
            warn!(?error, image_name, "Failed to compute a face embedding");
            None
        }
    }
}

/// Builds the embedding set of a request: the selfie, then every candidate with a detected face
///
/// Extractions run `concurrency` at a time but the candidates keep their collection order.
/// A candidate whose embedding has another dimension than the selfie's is skipped.
#[tracing::instrument(
    name = "Computing candidate embeddings",
    skip(extractor, selfie, candidates),
    fields(candidates = candidates.len())
)]
pub async fn embed_candidates(
    extractor: &dyn FaceEmbeddingExtractor,
    selfie: FaceEmbedding,
    candidates: &[CandidateImage],
    concurrency: usize,
) -> EmbeddingSet {
    let embeddings: Vec<(&CandidateImage, Option<FaceEmbedding>)> = stream::iter(candidates)
        .map(|candidate| async move {
            let embedding = embed_image(extractor, &candidate.key, &candidate.content).await;
            (candidate, embedding)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut embedding_set = EmbeddingSet::new(selfie);
    for (candidate, embedding) in embeddings {
        let Some(embedding) = embedding else {
            continue;
        };

        if let Err(error) = embedding_set.push_candidate(&candidate.key, embedding) {
            warn!(?error, "Skipping candidate image");
        }
    }

    info!(
        "{} candidate images out of {} have a face",
        embedding_set.candidate_count(),
        candidates.len()
    );
    embedding_set
}
