use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_multipart::MultipartError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;
use common::helper::{error_chain_fmt, error_chain_message};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    domain::entities::match_result::{FailedFile, MatchResult},
    use_cases::sort_by_selfie::{SortBySelfieError, SortBySelfieUseCase},
};

#[derive(Debug, MultipartForm)]
pub struct SelfieSortForm {
    pub selfie: Option<TempFile>,
}

#[derive(Debug, Serialize)]
pub struct SelfieSortResponse {
    /// `success`, or `partial_success` when some matches could not be published
    pub status: &'static str,
    pub total_matches: usize,
    /// -1 when the selfie was not clustered with any photo
    pub selfie_cluster: i64,
    pub matched_files: Vec<MatchResult>,
    pub failed_files: Vec<FailedFile>,
}

/// Finds the photographer photos showing the person of the selfie
#[tracing::instrument(name = "Selfie sort", skip(use_case, form))]
pub async fn selfie_sort(
    use_case: web::Data<SortBySelfieUseCase>,
    MultipartForm(form): MultipartForm<SelfieSortForm>,
) -> Result<HttpResponse, SelfieSortError> {
    let selfie = form.selfie.ok_or(SelfieSortError::MissingSelfie)?;
    let selfie = tokio::fs::read(selfie.file.path())
        .await
        .context("Failed to read the uploaded selfie")?;

    let result = use_case.execute(&selfie).await?;

    let status = if result.is_partial() {
        "partial_success"
    } else {
        "success"
    };
    info!(
        status,
        total_matches = result.report.published.len(),
        "Selfie sort done"
    );

    Ok(HttpResponse::Ok().json(SelfieSortResponse {
        status,
        total_matches: result.report.published.len(),
        selfie_cluster: result.selfie_label.as_i64(),
        matched_files: result.report.published,
        failed_files: result.report.failed,
    }))
}

/// A body that is not a readable multipart form carries no selfie
pub fn selfie_sort_form_error(error: MultipartError, _request: &HttpRequest) -> actix_web::Error {
    SelfieSortError::InvalidForm(error).into()
}

#[derive(thiserror::Error)]
pub enum SelfieSortError {
    #[error("Missing selfie")]
    MissingSelfie,
    #[error("Missing selfie")]
    InvalidForm(#[source] MultipartError),
    #[error("No face detected in selfie")]
    NoFaceDetected,
    #[error("{}", error_chain_message(.0))]
    SortFailed(SortBySelfieError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl From<SortBySelfieError> for SelfieSortError {
    fn from(error: SortBySelfieError) -> Self {
        match error {
            SortBySelfieError::NoFaceDetected => SelfieSortError::NoFaceDetected,
            error => SelfieSortError::SortFailed(error),
        }
    }
}

impl std::fmt::Debug for SelfieSortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SelfieSortError {
    fn status_code(&self) -> StatusCode {
        match self {
            SelfieSortError::MissingSelfie
            | SelfieSortError::InvalidForm(_)
            | SelfieSortError::NoFaceDetected => StatusCode::BAD_REQUEST,
            SelfieSortError::SortFailed(_) | SelfieSortError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from selfie_sort controller", skip(self), fields(error = ?self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
