use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_multipart::MultipartError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;
use common::helper::error_chain_fmt;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    domain::entities::match_result::FailedFile,
    use_cases::upload_folder::{StoredFile, UploadFolderUseCase, UploadedImage},
};

#[derive(Debug, MultipartForm)]
pub struct UploadFolderForm {
    /// Destination folder, `photographer-uploads` if missing
    pub s3_folder: Option<Text<String>>,
    /// The file names hold the path of each photo inside the uploaded folder
    pub folder_images: Vec<TempFile>,
}

#[derive(Debug, Serialize)]
pub struct UploadFolderResponse {
    pub status: &'static str,
    pub uploaded_count: usize,
    pub uploaded_files: Vec<StoredFile>,
    pub failed_files: Vec<FailedFile>,
}

/// Stores a whole folder of photographer photos
#[tracing::instrument(name = "Upload folder", skip(use_case, form))]
pub async fn upload_folder(
    use_case: web::Data<UploadFolderUseCase>,
    MultipartForm(form): MultipartForm<UploadFolderForm>,
) -> Result<HttpResponse, UploadFolderError> {
    if form.folder_images.is_empty() {
        return Err(UploadFolderError::NoImages);
    }

    let mut images = Vec::with_capacity(form.folder_images.len());
    for file in form.folder_images {
        images.push(read_uploaded_image(file).await?);
    }

    let folder = form.s3_folder.map(|folder| folder.into_inner());
    let report = use_case.execute(folder.as_deref(), images).await;

    info!(
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "Folder upload done"
    );
    Ok(HttpResponse::Ok().json(UploadFolderResponse {
        status: "Uploaded",
        uploaded_count: report.uploaded.len(),
        uploaded_files: report.uploaded,
        failed_files: report.failed,
    }))
}

async fn read_uploaded_image(file: TempFile) -> Result<UploadedImage, UploadFolderError> {
    let relative_path = file
        .file_name
        .clone()
        .unwrap_or_else(|| "unnamed".to_string());

    let content = tokio::fs::read(file.file.path())
        .await
        .with_context(|| format!("Failed to read the uploaded file {}", relative_path))?;

    Ok(UploadedImage {
        relative_path,
        content,
        content_type: file.content_type.map(|mime| mime.to_string()),
    })
}

/// A body that is not a readable multipart form carries no image
pub fn upload_folder_form_error(error: MultipartError, _request: &HttpRequest) -> actix_web::Error {
    UploadFolderError::InvalidForm(error).into()
}

#[derive(thiserror::Error)]
pub enum UploadFolderError {
    #[error("No images uploaded")]
    NoImages,
    #[error("No images uploaded")]
    InvalidForm(#[source] MultipartError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl std::fmt::Debug for UploadFolderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for UploadFolderError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadFolderError::NoImages | UploadFolderError::InvalidForm(_) => {
                StatusCode::BAD_REQUEST
            }
            UploadFolderError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from upload_folder controller", skip(self), fields(error = ?self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
