/// Extensions of the stored photos considered for matching, compared case-insensitively
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A stored photographer image, downloaded for the duration of one matching request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateImage {
    /// Storage key, ex: `photographer-uploads/wedding/IMG_0001.JPG`
    pub key: String,
    pub content: Vec<u8>,
}

impl CandidateImage {
    pub fn new(key: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            content,
        }
    }

    /// Last segment of the storage key
    pub fn file_name(&self) -> &str {
        file_name_of(&self.key)
    }
}

pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn extension_of(key: &str) -> Option<String> {
    let file_name = file_name_of(key);
    let (_, extension) = file_name.rsplit_once('.')?;
    Some(extension.to_ascii_lowercase())
}

/// Whether a storage key points to a photo in a supported format (`.jpg`, `.jpeg`, `.png`, any case)
pub fn is_supported_image_key(key: &str) -> bool {
    extension_of(key)
        .map(|extension| SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()))
        .unwrap_or(false)
}

/// MIME type to store an object with, from its key extension
pub fn content_type_for_key(key: &str) -> &'static str {
    match extension_of(key).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
