use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::{
    domain::entities::{candidate_image::content_type_for_key, match_result::FailedFile},
    ports::object_storage::ObjectStorage,
};

pub const DEFAULT_UPLOAD_FOLDER: &str = "photographer-uploads";

/// One file of an uploaded folder
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Path of the file inside the uploaded folder, as sent by the client
    pub relative_path: String,
    pub content: Vec<u8>,
    /// Content type sent by the client, if any
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<StoredFile>,
    pub failed: Vec<FailedFile>,
}

/// Folder where a batch of photos is stored
///
/// Surrounding whitespaces are removed and inner spaces become `-`.
/// A missing or blank name gives `photographer-uploads`.
pub fn normalize_folder(folder: Option<&str>) -> String {
    let folder = folder.map(str::trim).unwrap_or_default();
    if folder.is_empty() {
        return DEFAULT_UPLOAD_FOLDER.to_string();
    }
    folder.replace(' ', "-")
}

/// Client paths may come from Windows
pub fn normalize_relative_path(relative_path: &str) -> String {
    relative_path.replace('\\', "/")
}

/// Stores the photos of a photographer so that selfies can be matched against them
pub struct UploadFolderUseCase {
    storage: Arc<dyn ObjectStorage>,
    presigned_url_expiry_seconds: u32,
}

impl UploadFolderUseCase {
    pub fn new(storage: Arc<dyn ObjectStorage>, presigned_url_expiry_seconds: u32) -> Self {
        Self {
            storage,
            presigned_url_expiry_seconds,
        }
    }

    /// Stores each image under `{folder}/{relative path}` and links to it
    ///
    /// A file that cannot be stored is reported in `UploadReport::failed`, the others go on.
    #[tracing::instrument(
        name = "Uploading a folder of photos",
        skip(self, images),
        fields(images = images.len())
    )]
    pub async fn execute(&self, folder: Option<&str>, images: Vec<UploadedImage>) -> UploadReport {
        let folder = normalize_folder(folder);
        let mut report = UploadReport::default();

        for image in images {
            let filename = normalize_relative_path(&image.relative_path);
            let key = format!("{}/{}", folder, filename);
            let content_type = image
                .content_type
                .as_deref()
                .unwrap_or_else(|| content_type_for_key(&key));

            let stored = match self
                .storage
                .put_object(&key, &image.content, content_type)
                .await
            {
                Ok(()) => self
                    .storage
                    .presigned_get_url(&key, self.presigned_url_expiry_seconds),
                Err(error) => Err(error),
            };

            match stored {
                Ok(url) => report.uploaded.push(StoredFile { filename, url }),
                Err(error) => {
                    error!(?error, key = %key, "Failed to upload a photo");
                    report.failed.push(FailedFile {
                        filename,
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            folder = %folder,
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "Uploaded folder"
        );
        report
    }
}
