use tracing::{error, info};
use uuid::Uuid;

use crate::{
    domain::entities::{
        candidate_image::{content_type_for_key, file_name_of, CandidateImage},
        match_result::{FailedFile, MatchResult, SelectedMatch},
    },
    ports::object_storage::{ObjectStorage, ObjectStorageError},
};

/// What happened to the matches of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub published: Vec<MatchResult>,
    pub failed: Vec<FailedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// There was no match to publish
    NothingToPublish,
    Complete,
    /// Some matches were published, some failed
    Partial,
    /// Every match failed
    Failed,
}

impl PublishReport {
    pub fn outcome(&self) -> PublishOutcome {
        match (self.published.is_empty(), self.failed.is_empty()) {
            (true, true) => PublishOutcome::NothingToPublish,
            (false, true) => PublishOutcome::Complete,
            (false, false) => PublishOutcome::Partial,
            (true, false) => PublishOutcome::Failed,
        }
    }
}

/// Key of the published copy of `source_key`: `{prefix}/{32 random hex}_{file name}`
pub fn matched_object_key(matches_prefix: &str, source_key: &str) -> String {
    format!(
        "{}/{}_{}",
        matches_prefix.trim_end_matches('/'),
        Uuid::new_v4().simple(),
        file_name_of(source_key)
    )
}

async fn publish_one(
    storage: &dyn ObjectStorage,
    matches_prefix: &str,
    candidate: &CandidateImage,
    expiry_seconds: u32,
) -> Result<String, ObjectStorageError> {
    let destination_key = matched_object_key(matches_prefix, &candidate.key);

    storage
        .put_object(
            &destination_key,
            &candidate.content,
            content_type_for_key(&candidate.key),
        )
        .await?;

    storage.presigned_get_url(&destination_key, expiry_seconds)
}

/// Copies the content of each selected match to the results location and links to the copies
///
/// Matches are published in the given order. A failure does not stop the others: it is
/// reported in `PublishReport::failed` with its cause.
#[tracing::instrument(
    name = "Publishing matches",
    skip(storage, selected, candidates),
    fields(matches = selected.len())
)]
pub async fn publish_matches(
    storage: &dyn ObjectStorage,
    selected: &[SelectedMatch],
    candidates: &[CandidateImage],
    matches_prefix: &str,
    expiry_seconds: u32,
) -> PublishReport {
    let mut report = PublishReport::default();

    for selected_match in selected {
        let Some(candidate) = candidates
            .iter()
            .find(|candidate| candidate.key == selected_match.key)
        else {
            error!(key = %selected_match.key, "Matched image content is not available");
            report.failed.push(FailedFile {
                filename: selected_match.key.clone(),
                error: "The matched image content is not available".to_string(),
            });
            continue;
        };

        match publish_one(storage, matches_prefix, candidate, expiry_seconds).await {
            Ok(url) => report.published.push(MatchResult {
                filename: selected_match.key.clone(),
                cluster: selected_match.label.as_i64(),
                url,
            }),
            Err(error) => {
                error!(?error, key = %selected_match.key, "Failed to publish a match");
                report.failed.push(FailedFile {
                    filename: selected_match.key.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    info!(
        published = report.published.len(),
        failed = report.failed.len(),
        "Published matches"
    );
    report
}
