pub mod dbscan_clusterer;
pub mod match_selector;
