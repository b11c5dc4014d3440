use serde::{Deserialize, Serialize};

use super::cluster_labeling::ClusterLabel;

/// A candidate that belongs to the selfie's cluster, before being published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedMatch {
    /// Storage key of the candidate image
    pub key: String,
    pub label: ClusterLabel,
}

/// A matched photo copied to the results location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Storage key of the original photo
    pub filename: String,
    pub cluster: i64,
    /// Time-limited link to the published copy
    pub url: String,
}

/// A file that could not be stored, reported instead of being silently dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub filename: String,
    pub error: String,
}
