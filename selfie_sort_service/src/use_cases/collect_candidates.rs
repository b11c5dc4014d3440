use futures::{future, stream, StreamExt};
use tracing::{info, warn};

use crate::{
    domain::entities::candidate_image::{is_supported_image_key, CandidateImage},
    ports::object_storage::{ObjectStorage, ObjectStorageError},
};

/// Downloads every stored photo under `prefix` that may contain faces
///
/// Only `.jpg`, `.jpeg` and `.png` keys are kept. Downloads run `concurrency` at a time,
/// and the images are returned in the listing order.
/// A photo that cannot be downloaded is logged and skipped, only a failure of the listing
/// itself is returned as an error.
#[tracing::instrument(name = "Collecting candidate images", skip(storage))]
pub async fn collect_candidates(
    storage: &dyn ObjectStorage,
    prefix: &str,
    concurrency: usize,
) -> Result<Vec<CandidateImage>, ObjectStorageError> {
    let keys: Vec<String> = storage
        .list_keys(prefix)
        .await?
        .into_iter()
        .filter(|key| is_supported_image_key(key))
        .collect();
    let listed = keys.len();

    let candidates: Vec<CandidateImage> = stream::iter(keys)
        .map(|key| async move {
            match storage.get_object(&key).await {
                Ok(content) => Some(CandidateImage::new(key, content)),
                Err(error) => {
                    warn!(
                        ?error,
                        key = %key,
                        "Skipping candidate image that could not be downloaded"
                    );
                    None
                }
            }
        })
        // `buffered` yields in input order
        .buffered(concurrency.max(1))
        .filter_map(future::ready)
        .collect()
        .await;

    info!(
        "Collected {} candidate images out of {} listed",
        candidates.len(),
        listed
    );
    Ok(candidates)
}
