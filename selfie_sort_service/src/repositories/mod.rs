pub mod deepface_embedding_repository;
pub mod in_memory_object_storage;
pub mod object_storage_s3_repository;
