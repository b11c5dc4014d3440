use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub object_storage: ObjectStorageSettings,
    pub face_embedding: FaceEmbeddingSettings,
    pub selfie_sort: SelfieSortSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ObjectStorageSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub region: String,
    /// A bucket for each environment
    pub bucket_name: String,
    /// Lifetime of the links returned for uploaded and matched photos
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub presigned_url_expiry_seconds: u32,
}

impl ObjectStorageSettings {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// DeepFace-compatible embedding service (`POST {base_url}/represent`)
#[derive(Deserialize, Debug, Clone)]
pub struct FaceEmbeddingSettings {
    pub base_url: String,
    /// Ex: "ArcFace" (512 dimensions)
    pub model_name: String,
    /// Ex: "opencv", "retinaface"
    pub detector_backend: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl FaceEmbeddingSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SelfieSortSettings {
    /// Where the photographer uploads live, ex: "photographer-uploads/"
    pub candidates_prefix: String,
    /// Where matched photos are copied, ex: "matched-selfies"
    pub matches_prefix: String,
    /// Maximum cosine distance between two faces of the same person
    pub max_neighbor_distance: f64,
    /// Neighborhood size (the face itself included) needed to start a cluster
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_samples: usize,
    /// Number of candidate downloads running at the same time for one request
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub download_concurrency: usize,
    /// Number of embedding requests running at the same time for one request
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub extraction_concurrency: usize,
}

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` should contain shared settings for all environments.
/// A specific env file should be created for each environment: `local.yaml` and `production.yaml`
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `local.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator
/// For ex: `APP_SELFIE_SORT__MAX_NEIGHBOR_DISTANCE=0.4` would set `Settings.selfie_sort.max_neighbor_distance`
pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let base_path = std::env::current_dir()?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigurationError::UnknownEnvironment)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to determine the current directory: {0}")]
    CurrentDirectory(#[from] std::io::Error),
    #[error("{0}")]
    UnknownEnvironment(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// The possible runtime environment for our application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
