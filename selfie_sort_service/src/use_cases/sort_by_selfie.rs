use std::sync::Arc;

use common::helper::error_chain_fmt;
use tracing::info;

use crate::{
    configuration::SelfieSortSettings,
    domain::{
        entities::cluster_labeling::ClusterLabel,
        services::match_selector::{select_matches, MatchSelectionError},
    },
    ports::{
        face_embedding_extractor::FaceEmbeddingExtractor,
        object_storage::{ObjectStorage, ObjectStorageError},
        partition_clusterer::{ClusteringError, PartitionClusterer},
    },
    use_cases::{
        collect_candidates::collect_candidates,
        extract_embeddings::{embed_candidates, embed_image},
        publish_matches::{publish_matches, PublishOutcome, PublishReport},
    },
};

/// Finds the stored photos showing the person of a selfie and publishes them
pub struct SortBySelfieUseCase {
    storage: Arc<dyn ObjectStorage>,
    extractor: Arc<dyn FaceEmbeddingExtractor>,
    clusterer: Arc<dyn PartitionClusterer>,
    settings: SelfieSortSettings,
    presigned_url_expiry_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfieSortResult {
    pub selfie_label: ClusterLabel,
    pub report: PublishReport,
}

impl SelfieSortResult {
    /// Some matches could not be published
    pub fn is_partial(&self) -> bool {
        self.report.outcome() == PublishOutcome::Partial
    }
}

#[derive(thiserror::Error)]
pub enum SortBySelfieError {
    #[error("No face detected in selfie")]
    NoFaceDetected,
    #[error("Failed to list the candidate images")]
    CandidateListingFailed(#[source] ObjectStorageError),
    #[error("Failed to cluster the face embeddings")]
    ClusteringFailed(#[from] ClusteringError),
    #[error("Failed to select the matches")]
    MatchSelectionFailed(#[from] MatchSelectionError),
    #[error("None of the {0} matches could be published")]
    PublicationFailed(usize),
}

impl std::fmt::Debug for SortBySelfieError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SortBySelfieUseCase {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        extractor: Arc<dyn FaceEmbeddingExtractor>,
        clusterer: Arc<dyn PartitionClusterer>,
        settings: SelfieSortSettings,
        presigned_url_expiry_seconds: u32,
    ) -> Self {
        Self {
            storage,
            extractor,
            clusterer,
            settings,
            presigned_url_expiry_seconds,
        }
    }

    /// Runs the whole matching pipeline for one selfie
    ///
    /// The selfie is embedded first so that a selfie without face costs no storage call.
    /// Candidates are downloaded and embedded on every call.
    #[tracing::instrument(name = "Sorting photos by selfie", skip(self, selfie))]
    pub async fn execute(&self, selfie: &[u8]) -> Result<SelfieSortResult, SortBySelfieError> {
        let selfie_embedding = embed_image(self.extractor.as_ref(), "selfie", selfie)
            .await
            .ok_or(SortBySelfieError::NoFaceDetected)?;

        let candidates = collect_candidates(
            self.storage.as_ref(),
            &self.settings.candidates_prefix,
            self.settings.download_concurrency,
        )
        .await
        .map_err(SortBySelfieError::CandidateListingFailed)?;

        let embedding_set = embed_candidates(
            self.extractor.as_ref(),
            selfie_embedding,
            &candidates,
            self.settings.extraction_concurrency,
        )
        .await;

        let labeling = self.clusterer.partition(&embedding_set)?;
        let selection = select_matches(&embedding_set, &labeling)?;
        info!(
            selfie_cluster = selection.selfie_label.as_i64(),
            matches = selection.matches.len(),
            "Selected the photos clustered with the selfie"
        );

        let report = publish_matches(
            self.storage.as_ref(),
            &selection.matches,
            &candidates,
            &self.settings.matches_prefix,
            self.presigned_url_expiry_seconds,
        )
        .await;

        if report.outcome() == PublishOutcome::Failed {
            return Err(SortBySelfieError::PublicationFailed(report.failed.len()));
        }

        Ok(SelfieSortResult {
            selfie_label: selection.selfie_label,
            report,
        })
    }
}
