pub mod face_embedding_extractor;
pub mod object_storage;
pub mod partition_clusterer;
