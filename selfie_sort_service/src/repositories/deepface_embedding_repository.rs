use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    configuration::FaceEmbeddingSettings,
    domain::entities::face_embedding::FaceEmbedding,
    ports::face_embedding_extractor::{FaceEmbeddingExtractor, FaceEmbeddingExtractorError},
};

const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

/// Message returned by DeepFace when `enforce_detection` is set and no face was found
const FACE_NOT_DETECTED_MESSAGE: &str = "Face could not be detected";

/// Face embeddings computed by a DeepFace API (`POST /represent`)
///
/// The image is sent inline as a base64 data URI, and detection is enforced:
/// an image without a face is an error on the DeepFace side.
/// When several faces are found, the first one is the primary face.
pub struct DeepFaceEmbeddingRepository {
    client: reqwest::Client,
    represent_url: String,
    model_name: String,
    detector_backend: String,
}

#[derive(Serialize)]
struct RepresentRequest<'a> {
    img: String,
    model_name: &'a str,
    detector_backend: &'a str,
    enforce_detection: bool,
}

#[derive(Deserialize)]
struct RepresentResponse {
    results: Vec<RepresentedFace>,
}

#[derive(Deserialize)]
struct RepresentedFace {
    embedding: Vec<f32>,
}

impl DeepFaceEmbeddingRepository {
    pub fn try_new(settings: &FaceEmbeddingSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            represent_url: format!("{}/represent", settings.base_url.trim_end_matches('/')),
            model_name: settings.model_name.clone(),
            detector_backend: settings.detector_backend.clone(),
        })
    }
}

/// `data:` URI accepted by DeepFace, the MIME type is sniffed from the image signature
fn to_data_uri(image: &[u8]) -> String {
    let mime = if image.starts_with(&PNG_SIGNATURE) {
        "image/png"
    } else {
        "image/jpeg"
    };

    format!("data:{};base64,{}", mime, STANDARD.encode(image))
}

/// Classifies a non-success answer from DeepFace
fn error_from_response(status: StatusCode, body: &str) -> FaceEmbeddingExtractorError {
    if status == StatusCode::BAD_REQUEST && body.contains(FACE_NOT_DETECTED_MESSAGE) {
        return FaceEmbeddingExtractorError::NoFaceDetected;
    }

    FaceEmbeddingExtractorError::ModelError(anyhow::anyhow!(
        "Face embedding service answered {}: {}",
        status,
        body
    ))
}

#[async_trait]
impl FaceEmbeddingExtractor for DeepFaceEmbeddingRepository {
    #[tracing::instrument(name = "Requesting face embedding", skip(self, image), fields(size = image.len()))]
    async fn extract(&self, image: &[u8]) -> Result<FaceEmbedding, FaceEmbeddingExtractorError> {
        let request = RepresentRequest {
            img: to_data_uri(image),
            model_name: &self.model_name,
            detector_backend: &self.detector_backend,
            enforce_detection: true,
        };

        let response = self
            .client
            .post(&self.represent_url)
            .json(&request)
            .send()
            .await
            .context("Failed to call the face embedding service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let represented: RepresentResponse = response
            .json()
            .await
            .context("Failed to parse the face embedding service response")?;

        debug!("{} faces found", represented.results.len());

        let primary_face = represented
            .results
            .into_iter()
            .next()
            .ok_or(FaceEmbeddingExtractorError::NoFaceDetected)?;

        FaceEmbedding::parse(primary_face.embedding)
            .map_err(|error| FaceEmbeddingExtractorError::InvalidEmbedding(error.to_string()))
    }
}
