use common::helper::error_chain_fmt;

use crate::domain::entities::{
    cluster_labeling::{ClusterLabel, ClusterLabeling},
    embedding_set::{EmbeddingRole, EmbeddingSet},
    match_result::SelectedMatch,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSelection {
    pub selfie_label: ClusterLabel,
    /// Candidates of the selfie's cluster, in the order of the embedding set
    pub matches: Vec<SelectedMatch>,
}

/// Selects the candidates clustered with the selfie
///
/// Labels are read by role, not by position: the selfie entry gives the selfie's label
/// and only `Candidate` entries can be selected.
/// A selfie labeled as noise matches nobody, even if some candidates are noise too.
pub fn select_matches(
    embeddings: &EmbeddingSet,
    labeling: &ClusterLabeling,
) -> Result<MatchSelection, MatchSelectionError> {
    if labeling.len() != embeddings.len() {
        return Err(MatchSelectionError::LengthMismatch {
            embeddings: embeddings.len(),
            labels: labeling.len(),
        });
    }

    let tagged_labels = embeddings.entries().iter().zip(labeling.as_slice());

    let selfie_label = tagged_labels
        .clone()
        .find(|(entry, _)| entry.role == EmbeddingRole::Selfie)
        .map(|(_, label)| *label)
        .ok_or(MatchSelectionError::MissingSelfie)?;

    if selfie_label.is_noise() {
        return Ok(MatchSelection {
            selfie_label,
            matches: vec![],
        });
    }

    let matches = tagged_labels
        .filter_map(|(entry, label)| match &entry.role {
            EmbeddingRole::Candidate(key) if *label == selfie_label => Some(SelectedMatch {
                key: key.clone(),
                label: *label,
            }),
            _ => None,
        })
        .collect();

    Ok(MatchSelection {
        selfie_label,
        matches,
    })
}

#[derive(thiserror::Error)]
pub enum MatchSelectionError {
    #[error("{labels} cluster labels were computed for {embeddings} embeddings")]
    LengthMismatch { embeddings: usize, labels: usize },
    #[error("The embedding set has no selfie")]
    MissingSelfie,
}

impl std::fmt::Debug for MatchSelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
