use std::collections::VecDeque;

use crate::{
    domain::entities::{
        cluster_labeling::{ClusterLabel, ClusterLabeling},
        embedding_set::EmbeddingSet,
    },
    ports::partition_clusterer::{ClusteringError, PartitionClusterer},
};

pub const DEFAULT_MAX_NEIGHBOR_DISTANCE: f64 = 0.45;
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// Density-based clustering (DBSCAN) over the cosine distance between embeddings.
///
/// - `max_neighbor_distance` (eps): two embeddings closer than or at this distance are neighbors
/// - `min_samples`: size of the neighborhood, the point itself included, needed to be a core point
///
/// Clusters grow from core points, in the order of the set. A point which is not a core point and
/// has no core neighbor is labeled `Noise`. A non-core point reachable from several clusters gets
/// the label of the first cluster that reaches it.
/// Labels are numbered from 0 in discovery order, so the same input always gives the same labeling.
#[derive(Debug, Clone)]
pub struct DbscanClusterer {
    max_neighbor_distance: f64,
    min_samples: usize,
}

impl DbscanClusterer {
    pub fn new(max_neighbor_distance: f64, min_samples: usize) -> Result<Self, ClusteringError> {
        if !max_neighbor_distance.is_finite() || !(0.0..=2.0).contains(&max_neighbor_distance) {
            return Err(ClusteringError::InvalidParameter(format!(
                "the maximum neighbor distance must be between 0 and 2, got {}",
                max_neighbor_distance
            )));
        }

        if min_samples == 0 {
            return Err(ClusteringError::InvalidParameter(
                "the minimum number of samples must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_neighbor_distance,
            min_samples,
        })
    }

    pub fn max_neighbor_distance(&self) -> f64 {
        self.max_neighbor_distance
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Indices of the neighbors of every embedding, itself included
    fn neighborhoods(&self, embeddings: &EmbeddingSet) -> Vec<Vec<usize>> {
        let entries = embeddings.entries();

        entries
            .iter()
            .enumerate()
            .map(|(i, a)| {
                entries
                    .iter()
                    .enumerate()
                    .filter(|(j, b)| {
                        *j == i
                            || a.embedding.cosine_distance(&b.embedding)
                                <= self.max_neighbor_distance
                    })
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect()
    }
}

impl Default for DbscanClusterer {
    fn default() -> Self {
        Self {
            max_neighbor_distance: DEFAULT_MAX_NEIGHBOR_DISTANCE,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl PartitionClusterer for DbscanClusterer {
    #[tracing::instrument(
        name = "Clustering embeddings",
        skip(self, embeddings),
        fields(embeddings = embeddings.len())
    )]
    fn partition(&self, embeddings: &EmbeddingSet) -> Result<ClusterLabeling, ClusteringError> {
        let dimension = embeddings.dimension();
        if let Some(other) = embeddings
            .embeddings()
            .map(|embedding| embedding.dimension())
            .find(|other| *other != dimension)
        {
            return Err(ClusteringError::DimensionMismatch(dimension, other));
        }

        let neighborhoods = self.neighborhoods(embeddings);
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|neighbors| neighbors.len() >= self.min_samples)
            .collect();

        let mut labels = vec![ClusterLabel::Noise; embeddings.len()];
        let mut next_cluster = 0_u32;

        for seed in 0..embeddings.len() {
            if !labels[seed].is_noise() || !is_core[seed] {
                continue;
            }

            let cluster = ClusterLabel::Cluster(next_cluster);
            labels[seed] = cluster;

            let mut to_visit = VecDeque::from([seed]);
            while let Some(point) = to_visit.pop_front() {
                // Only core points extend a cluster
                if !is_core[point] {
                    continue;
                }

                for &neighbor in &neighborhoods[point] {
                    if labels[neighbor].is_noise() {
                        labels[neighbor] = cluster;
                        to_visit.push_back(neighbor);
                    }
                }
            }

            next_cluster += 1;
        }

        Ok(ClusterLabeling::new(labels))
    }
}
