use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::{log::SetLoggerError, LogTracer};
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

use crate::helper::error_chain_fmt;

/// Builds the subscriber shared by every binary and test suite of the workspace.
///
/// Layers, in order:
/// - `EnvFilter`: reads `RUST_LOG`, or `fallback_env_filter` when it is not set
/// - `JsonStorageLayer`: keeps span fields so they are attached to child events
/// - `BunyanFormattingLayer`: writes bunyan-compatible JSON lines to `sink`
///
/// # Arguments
/// - `name`: name of the app, written in every log line
/// - `fallback_env_filter`: filter used when `RUST_LOG` is not set (ex: "info")
/// - `sink`: where the logs are written (stdout for the service, `std::io::sink` for quiet tests)
pub fn get_tracing_subscriber<Sink>(
    name: String,
    fallback_env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    // The sink must be able to produce a writer for any lifetime
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_env_filter));

    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

#[derive(thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to redirect `log` records to tracing: {0}")]
    LogTracerError(#[from] SetLoggerError),
    #[error("Failed to set the global tracing subscriber: {0}")]
    GlobalDefaultError(#[from] SetGlobalDefaultError),
}

impl std::fmt::Debug for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Installs `subscriber` as the process-wide default and forwards `log` records to it.
///
/// Must only be called once per process: a second call returns an error.
pub fn init_tracing_subscriber(
    subscriber: impl Subscriber + Send + Sync,
) -> Result<(), TelemetryError> {
    // Dependencies such as rust-s3 and reqwest emit through `log`
    LogTracer::init()?;

    set_global_default(subscriber)?;
    Ok(())
}
