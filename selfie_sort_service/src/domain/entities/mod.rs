pub mod candidate_image;
pub mod cluster_labeling;
pub mod embedding_set;
pub mod face_embedding;
pub mod match_result;
