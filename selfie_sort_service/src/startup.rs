use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use s3::{creds::Credentials, Bucket, BucketConfiguration, Region};
use secrecy::ExposeSecret;
use std::{net::TcpListener, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{ObjectStorageSettings, Settings},
    controllers::{
        health_check, selfie_sort, selfie_sort_form_error, upload_folder, upload_folder_form_error,
    },
    domain::services::dbscan_clusterer::DbscanClusterer,
    ports::{
        face_embedding_extractor::FaceEmbeddingExtractor, object_storage::ObjectStorage,
        partition_clusterer::ClusteringError,
    },
    repositories::{
        deepface_embedding_repository::DeepFaceEmbeddingRepository,
        object_storage_s3_repository::ObjectStorageS3Repository,
    },
    use_cases::{sort_by_selfie::SortBySelfieUseCase, upload_folder::UploadFolderUseCase},
};

/// Total size of the files of one multipart request: a whole folder of photos
const MAX_UPLOAD_SIZE_BYTES: usize = 1024 * 1024 * 1024;

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error("S3 credentials error: {0}")]
    S3CredentialsError(#[from] s3::creds::error::CredentialsError),
    #[error(transparent)]
    S3Error(#[from] s3::error::S3Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Failed to build the face embedding client: {0}")]
    FaceEmbeddingClientError(#[from] reqwest::Error),
    #[error("Invalid selfie sort settings: {0}")]
    ClusteringSettingsError(#[from] ClusteringError),
}

impl Application {
    /// Builds the application on top of S3 and the DeepFace service
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application")]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let s3_bucket = set_up_s3(&settings.object_storage).await?;
        let storage = Arc::new(ObjectStorageS3Repository::new(s3_bucket));

        let extractor = Arc::new(DeepFaceEmbeddingRepository::try_new(
            &settings.face_embedding,
        )?);

        Self::build_with_adapters(settings, nb_workers, storage, extractor)
    }

    /// Builds the application on top of the given storage and embedding model
    ///
    /// The clustering parameters are read from `settings.selfie_sort`.
    pub fn build_with_adapters(
        settings: Settings,
        nb_workers: Option<usize>,
        storage: Arc<dyn ObjectStorage>,
        extractor: Arc<dyn FaceEmbeddingExtractor>,
    ) -> Result<Self, ApplicationBuildError> {
        let clusterer = DbscanClusterer::new(
            settings.selfie_sort.max_neighbor_distance,
            settings.selfie_sort.min_samples,
        )?;

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let expiry_seconds = settings.object_storage.presigned_url_expiry_seconds;
        let sort_by_selfie = SortBySelfieUseCase::new(
            storage.clone(),
            extractor,
            Arc::new(clusterer),
            settings.selfie_sort,
            expiry_seconds,
        );
        let upload_folder_use_case = UploadFolderUseCase::new(storage, expiry_seconds);

        let server = run(listener, nb_workers, sort_by_selfie, upload_folder_use_case)?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// Cors middleware: any origin may call the API, preflight requests are answered directly.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    nb_workers: Option<usize>,
    sort_by_selfie: SortBySelfieUseCase,
    upload_folder_use_case: UploadFolderUseCase,
) -> Result<Server, std::io::Error> {
    // Use cases only hold `Arc`s to the adapters: they are shared among all workers
    let sort_by_selfie = Data::new(sort_by_selfie);
    let upload_folder_use_case = Data::new(upload_folder_use_case);

    let server = HttpServer::new(move || {
        info!("Starting actix-web worker");

        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/upload_folder")
                    .app_data(multipart_form_config().error_handler(upload_folder_form_error))
                    .route(web::post().to(upload_folder)),
            )
            .service(
                web::resource("/selfie_sort")
                    .app_data(multipart_form_config().error_handler(selfie_sort_form_error))
                    .route(web::post().to(selfie_sort)),
            )
            .app_data(sort_by_selfie.clone())
            .app_data(upload_folder_use_case.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    Ok(server.run())
}

fn multipart_form_config() -> MultipartFormConfig {
    MultipartFormConfig::default().total_limit(MAX_UPLOAD_SIZE_BYTES)
}

/// Sets up the S3 object storage
///
/// Each environment uses 1 bucket, created if it does not exist yet.
///
/// # Returns
/// An initialized bucket
#[tracing::instrument(name = "Setting up S3 object store")]
pub async fn set_up_s3(settings: &ObjectStorageSettings) -> Result<Bucket, ApplicationBuildError> {
    let region = Region::Custom {
        region: settings.region.to_owned(),
        endpoint: settings.endpoint(),
    };

    let credentials = Credentials::new(
        Some(&settings.username),
        Some(settings.password.expose_secret()),
        None,
        None,
        None,
    )?;

    let bucket =
        Bucket::new(&settings.bucket_name, region.clone(), credentials.clone())?.with_path_style();

    // Only a bucket not found (404) leads to its creation
    if let Err(error) = bucket.head_object("/").await {
        match error {
            s3::error::S3Error::Http(404, _) => {}
            error => return Err(ApplicationBuildError::S3Error(error)),
        }

        info!("Unknown bucket {}, creating it ...", settings.bucket_name);

        Bucket::create_with_path_style(
            &settings.bucket_name,
            region,
            credentials,
            BucketConfiguration::default(),
        )
        .await?;
    }

    info!(
        "Bucket {} has been correctly instantiated",
        settings.bucket_name
    );
    Ok(bucket)
}
