pub mod collect_candidates;
pub mod extract_embeddings;
pub mod publish_matches;
pub mod sort_by_selfie;
pub mod upload_folder;

#[cfg(test)]
mod test_doubles;
