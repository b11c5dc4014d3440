/// Cluster assigned to one embedding by a clustering run.
///
/// Only equality between labels of the same run is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    /// Not close enough to other embeddings to belong to any cluster
    Noise,
    Cluster(u32),
}

impl ClusterLabel {
    /// Integer used for `Noise` in API responses
    pub const NOISE_VALUE: i64 = -1;

    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            ClusterLabel::Noise => Self::NOISE_VALUE,
            ClusterLabel::Cluster(id) => *id as i64,
        }
    }
}

impl From<ClusterLabel> for i64 {
    fn from(label: ClusterLabel) -> Self {
        label.as_i64()
    }
}

/// One label per entry of an `EmbeddingSet`, in the same order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLabeling(Vec<ClusterLabel>);

impl ClusterLabeling {
    pub fn new(labels: Vec<ClusterLabel>) -> Self {
        Self(labels)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ClusterLabel> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[ClusterLabel] {
        &self.0
    }

    /// Whether two entries are considered the same person. Noise is never in the same cluster as anything.
    pub fn same_cluster(&self, a: usize, b: usize) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(ClusterLabel::Cluster(x)), Some(ClusterLabel::Cluster(y))) => x == y,
            _ => false,
        }
    }
}
